//! Diagnostic visualizer: rasterizes one year's mosaic scene to a PNG.
//! Not part of the main pipeline. Text is not rasterized; each planned label
//! is drawn as its estimated bounding box around the label anchor.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mosaic_core::encode::inflation::legend;
use mosaic_core::encode::{Rgb, TextLabel};
use mosaic_core::partition::{weighted_tree, Partitioner, Polygon, Rect};
use mosaic_core::scene::Scene;
use mosaic_core::{compose_scene, Dataset, FilterState, MosaicConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "visualize", about = "Render a GDP mosaic scene to PNG")]
struct Args {
    /// CSV data file.
    #[arg(long)]
    data: PathBuf,

    /// Year to render (defaults to the latest in the data).
    #[arg(long)]
    year: Option<i32>,

    #[arg(long, default_value = "scene.png")]
    out: PathBuf,

    #[arg(long, default_value_t = 1200)]
    width: u32,

    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Optional JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
}

const LEGEND_H: u32 = 24;
const LABEL_INK: Rgb = Rgb::new(40, 40, 40);
/// Average glyph advance as a fraction of the font size.
const GLYPH_ASPECT: f64 = 0.6;

// ── Raster helpers ────────────────────────────────────────────────────────────

fn blend(dst: image::Rgb<u8>, src: Rgb, alpha: f64) -> image::Rgb<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |d: u8, s: u8| (s as f64 * a + d as f64 * (1.0 - a)).round() as u8;
    image::Rgb([mix(dst[0], src.r), mix(dst[1], src.g), mix(dst[2], src.b)])
}

/// Scanline-free fill: tests every pixel centre in the polygon's bounding box.
fn fill_polygon(img: &mut image::RgbImage, poly: &Polygon, color: Rgb, alpha: f64) {
    let b = poly.bounds();
    let (w, h) = img.dimensions();
    let x0 = b.x.floor().max(0.0) as u32;
    let y0 = b.y.floor().max(0.0) as u32;
    let x1 = ((b.x + b.w).ceil().max(0.0) as u32).min(w);
    let y1 = ((b.y + b.h).ceil().max(0.0) as u32).min(h);
    for y in y0..y1 {
        for x in x0..x1 {
            if poly.contains([x as f64 + 0.5, y as f64 + 0.5]) {
                let px = blend(*img.get_pixel(x, y), color, alpha);
                img.put_pixel(x, y, px);
            }
        }
    }
}

/// Square brush stepped along each edge of the ring.
fn stroke_polygon(img: &mut image::RgbImage, poly: &Polygon, color: Rgb, width: f64) {
    let n = poly.vertices.len();
    if n < 2 {
        return;
    }
    let (w, h) = img.dimensions();
    let r = (width / 2.0).max(0.5);
    let px = image::Rgb(color.to_array());
    for i in 0..n {
        let [ax, ay] = poly.vertices[i];
        let [bx, by] = poly.vertices[(i + 1) % n];
        let steps = (bx - ax).abs().max((by - ay).abs()).ceil().max(1.0) as usize;
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            let (cx, cy) = (ax + (bx - ax) * t, ay + (by - ay) * t);
            let ylo = (cy - r).floor().max(0.0) as u32;
            let yhi = ((cy + r).ceil().max(0.0) as u32).min(h);
            let xlo = (cx - r).floor().max(0.0) as u32;
            let xhi = ((cx + r).ceil().max(0.0) as u32).min(w);
            for y in ylo..yhi {
                for x in xlo..xhi {
                    img.put_pixel(x, y, px);
                }
            }
        }
    }
}

/// Estimated extent of a label's text, centred on its anchor.
fn label_box(label: &TextLabel) -> Rect {
    let w = label.text.chars().count() as f64 * label.font_px * GLYPH_ASPECT;
    let h = label.font_px;
    Rect::new(label.anchor[0] - w / 2.0, label.anchor[1] - h / 2.0, w, h)
}

fn render(scene: &Scene, width: u32, height: u32) -> image::RgbImage {
    let mut img = image::RgbImage::from_pixel(width, height + LEGEND_H, image::Rgb([255, 255, 255]));

    for shape in &scene.shapes {
        fill_polygon(&mut img, &shape.polygon, shape.fill, shape.fill_opacity);
    }
    for shape in &scene.shapes {
        stroke_polygon(&mut img, &shape.polygon, shape.stroke, shape.stroke_width);
    }
    for outline in &scene.outlines {
        stroke_polygon(&mut img, &outline.polygon, outline.stroke, outline.stroke_width);
    }
    for label in scene.shapes.iter().flat_map(|s| &s.labels) {
        stroke_polygon(&mut img, &label_box(label).to_polygon(), LABEL_INK, 1.0);
    }

    // Inflation border legend along the bottom edge, -10% .. +10%.
    let stops = legend(21, 10.0);
    let cell = width as f64 / stops.len() as f64;
    for (i, (_, color)) in stops.iter().enumerate() {
        let rect = Rect::new(i as f64 * cell, height as f64, cell, LEGEND_H as f64);
        fill_polygon(&mut img, &rect.to_polygon(), *color, 1.0);
    }
    img
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => MosaicConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MosaicConfig::default(),
    };
    let dataset = Dataset::load(&args.data, &config)
        .with_context(|| format!("failed to load {}", args.data.display()))?;

    let year = args
        .year
        .or_else(|| dataset.latest_year())
        .context("dataset has no qualifying records")?;
    let root = dataset.hierarchy(&FilterState::new(year), &config.hierarchy);

    let bounds = Rect::new(0.0, 0.0, args.width as f64, args.height as f64).to_polygon();
    let partition = config.layout.partition(&weighted_tree(&root), &bounds);
    let scene = compose_scene(&root, &partition, &config);
    tracing::info!(year, shapes = scene.shapes.len(), outlines = scene.outlines.len(), "rendering");

    let img = render(&scene, args.width, args.height);
    img.save(&args.out)
        .with_context(|| format!("failed to save {}", args.out.display()))?;
    println!("Wrote {}", args.out.display());
    Ok(())
}
