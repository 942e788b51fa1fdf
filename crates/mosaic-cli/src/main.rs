//! Command-line front end: inspect a GDP dataset, print the hierarchy,
//! the leaderboard, or the fully styled scene as JSON.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mosaic_core::encode::format_magnitude;
use mosaic_core::hierarchy::{Member, Root};
use mosaic_core::partition::{weighted_tree, Partitioner, Rect};
use mosaic_core::ranking::leaderboard;
use mosaic_core::{compose_scene, Dataset, FilterState, MosaicConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mosaic", version, about = "GDP mosaic: hierarchy, ranking and scene builder")]
struct Cli {
    /// CSV data file (overrides the config's `source`).
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// JSON config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// URL query string (e.g. `?data=gdp.csv`) whose `data`/`src` key
    /// overrides the config's `source`. `--data` takes precedence.
    #[arg(short, long, global = true)]
    query: Option<String>,

    /// Raise log level (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Years, continents and record counts in the dataset.
    Info,
    /// Print the continent / country / sector hierarchy.
    Tree {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Print the top-K leaderboard.
    Rank {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(short, default_value_t = 10)]
        k: usize,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Lay out and style the hierarchy, emitting the scene as JSON.
    Scene {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value_t = 1200.0)]
        width: f64,
        #[arg(long, default_value_t = 800.0)]
        height: f64,
    },
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Year to show (defaults to the latest year in the data).
    #[arg(short, long)]
    year: Option<i32>,

    /// Restrict to these countries (repeatable).
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Restrict to these continents (repeatable).
    #[arg(long = "continent")]
    continents: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl FilterArgs {
    fn resolve(&self, dataset: &Dataset) -> Result<FilterState> {
        let year = match self.year.or_else(|| dataset.latest_year()) {
            Some(y) => y,
            None => bail!("dataset has no qualifying records"),
        };
        Ok(FilterState::new(year)
            .with_countries(self.countries.iter().cloned())
            .with_continents(self.continents.iter().cloned()))
    }
}

fn setup_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn resolve_config(cli: &Cli) -> Result<MosaicConfig> {
    let mut config = match &cli.config {
        Some(path) => MosaicConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MosaicConfig::default(),
    };
    if let Some(query) = &cli.query {
        config.apply_query(query);
    }
    if let Some(data) = &cli.data {
        config.source = data.display().to_string();
    }
    Ok(config)
}

fn load(cli: &Cli) -> Result<(Dataset, MosaicConfig)> {
    let config = resolve_config(cli)?;
    let dataset = Dataset::load(&config.source, &config)
        .with_context(|| format!("failed to load data from {}", config.source))?;
    Ok((dataset, config))
}

fn print_tree(root: &Root) {
    if root.is_empty() {
        println!("{} (empty)", root.label);
        return;
    }
    println!("{}  {}", root.label, format_magnitude(root.weight()));
    for group in &root.continents {
        println!("├── {}  {}", group.name, format_magnitude(group.weight()));
        for member in &group.members {
            match member {
                Member::Country(c) => {
                    println!("│   ├── {}  {}", c.name, format_magnitude(c.gdp));
                    for s in &c.sectors {
                        println!(
                            "│   │   └── {}  {:.1}%  {}",
                            s.sector.name(),
                            s.share * 100.0,
                            format_magnitude(s.value)
                        );
                    }
                }
                Member::Remainder(r) => {
                    println!("│   └── {}  {}  ({} countries)", r.label, format_magnitude(r.gdp), r.count);
                }
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let (dataset, config) = load(&cli)?;

    match &cli.command {
        Command::Info => {
            println!("records:    {}", dataset.len());
            match dataset.year_range() {
                Some((lo, hi)) => println!("years:      {lo}–{hi} ({} distinct)", dataset.years().len()),
                None => println!("years:      none"),
            }
            println!("continents: {}", dataset.continents().join(", "));
        }
        Command::Tree { filter, format } => {
            let filter = filter.resolve(&dataset)?;
            let root = dataset.hierarchy(&filter, &config.hierarchy);
            match format {
                Format::Text => print_tree(&root),
                Format::Json => println!("{}", serde_json::to_string_pretty(&root)?),
            }
        }
        Command::Rank { filter, k, format } => {
            let filter = filter.resolve(&dataset)?;
            let board = leaderboard(&dataset.top_k(&filter, *k));
            match format {
                Format::Text => {
                    for e in &board {
                        println!("{:>3}. {:<32} {:<16} {:>10}", e.rank, e.name, e.continent, e.formatted_gdp);
                    }
                }
                Format::Json => println!("{}", serde_json::to_string_pretty(&board)?),
            }
        }
        Command::Scene { filter, width, height } => {
            let filter = filter.resolve(&dataset)?;
            let root = dataset.hierarchy(&filter, &config.hierarchy);
            let bounds = Rect::new(0.0, 0.0, *width, *height).to_polygon();
            let partition = config.layout.partition(&weighted_tree(&root), &bounds);
            let scene = compose_scene(&root, &partition, &config);
            tracing::info!(shapes = scene.shapes.len(), missing = scene.missing, "scene composed");
            println!("{}", serde_json::to_string_pretty(&scene)?);
        }
    }
    Ok(())
}
