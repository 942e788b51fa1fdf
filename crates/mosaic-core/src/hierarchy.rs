//! Hierarchy builder: filtered records → World / continent / country / sector tree.
//!
//! Pipeline:
//!   filter → group by continent → rank by GDP and truncate to top-N →
//!   synthesize one remainder per truncated continent → sector expansion.
//!
//! Only leaves (country leaves, sector slices, remainders) carry values.
//! Internal weights are sums over descendants, so every continent's weight
//! equals the GDP total of its filtered members.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::filter::FilterState;
use crate::record::{Record, Sector, SectorShares};

/// Label prefix of synthesized remainder nodes.
pub const REMAINDER_PREFIX: &str = "Others (";

/// Tunables for tree construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyParams {
    /// Countries kept individually per continent.
    pub top_n: usize,
    /// Normalized sector shares below this are dropped.
    pub sector_threshold: f64,
    /// Expand countries into sector slices when share data allows.
    pub expand_sectors: bool,
    pub root_label: String,
}

impl Default for HierarchyParams {
    fn default() -> Self {
        Self {
            top_n: 9,
            sector_threshold: 1e-6,
            expand_sectors: true,
            root_label: "World".into(),
        }
    }
}

// ── Tree types ────────────────────────────────────────────────────────────────

/// Auxiliary indicators driving opacity and border color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub unemployment: Option<f64>,
    pub inflation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub label: String,
    pub continents: Vec<ContinentGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinentGroup {
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Member {
    Country(CountryNode),
    Remainder(AggregateRemainder),
}

/// A ranked country. Empty `sectors` means a GDP-valued leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryNode {
    pub name: String,
    pub continent: String,
    pub gdp: f64,
    pub indicators: Indicators,
    pub gdp_per_capita: Option<f64>,
    pub sectors: Vec<SectorSlice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorSlice {
    pub sector: Sector,
    /// Normalized share in (0, 1]; shares of one country sum to 1.
    pub share: f64,
    /// `gdp × share`.
    pub value: f64,
}

/// Everything in a continent past the top-N cutoff, folded into one leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRemainder {
    pub label: String,
    pub continent: String,
    /// Sum of the excluded members' GDP.
    pub gdp: f64,
    /// Number of excluded members.
    pub count: usize,
    /// Means over excluded members with a value.
    pub indicators: Indicators,
}

impl Root {
    pub fn empty(label: impl Into<String>) -> Self {
        Self { label: label.into(), continents: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.continents.is_empty()
    }

    pub fn weight(&self) -> f64 {
        self.continents.iter().map(ContinentGroup::weight).sum()
    }

    pub fn continent(&self, name: &str) -> Option<&ContinentGroup> {
        self.continents.iter().find(|c| c.name == name)
    }
}

impl ContinentGroup {
    pub fn weight(&self) -> f64 {
        self.members.iter().map(Member::weight).sum()
    }

    pub fn remainder(&self) -> Option<&AggregateRemainder> {
        self.members.iter().find_map(|m| match m {
            Member::Remainder(r) => Some(r),
            Member::Country(_) => None,
        })
    }

    pub fn countries(&self) -> impl Iterator<Item = &CountryNode> {
        self.members.iter().filter_map(|m| match m {
            Member::Country(c) => Some(c),
            Member::Remainder(_) => None,
        })
    }
}

impl Member {
    pub fn label(&self) -> &str {
        match self {
            Member::Country(c) => &c.name,
            Member::Remainder(r) => &r.label,
        }
    }

    pub fn continent(&self) -> &str {
        match self {
            Member::Country(c) => &c.continent,
            Member::Remainder(r) => &r.continent,
        }
    }

    pub fn indicators(&self) -> Indicators {
        match self {
            Member::Country(c) => c.indicators,
            Member::Remainder(r) => r.indicators,
        }
    }

    /// Leaf value, or the sum of sector slices for an expanded country.
    pub fn weight(&self) -> f64 {
        match self {
            Member::Country(c) => c.weight(),
            Member::Remainder(r) => r.gdp,
        }
    }
}

impl CountryNode {
    pub fn is_leaf(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn weight(&self) -> f64 {
        if self.sectors.is_empty() {
            self.gdp
        } else {
            self.sectors.iter().map(|s| s.value).sum()
        }
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

/// Normalize raw sector percentages to shares summing to 1.
///
/// Non-finite and negative raw values count as 0. Returns an empty vector
/// when nothing positive remains. Shares under `threshold` are dropped and
/// the survivors renormalized.
pub fn normalize_shares(shares: &SectorShares, threshold: f64) -> Vec<(Sector, f64)> {
    let raw: Vec<(Sector, f64)> = shares
        .iter()
        .map(|(s, v)| (s, if v.is_finite() && v > 0.0 { v } else { 0.0 }))
        .collect();
    let sum: f64 = raw.iter().map(|&(_, v)| v).sum();
    if sum <= 0.0 {
        return Vec::new();
    }

    let kept: Vec<(Sector, f64)> = raw
        .into_iter()
        .filter(|&(_, v)| v > 0.0 && v / sum >= threshold)
        .collect();
    let kept_sum: f64 = kept.iter().map(|&(_, v)| v).sum();
    if kept_sum <= 0.0 {
        return Vec::new();
    }
    kept.into_iter().map(|(s, v)| (s, v / kept_sum)).collect()
}

fn mean(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, n) = values
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn country_node(record: &Record, params: &HierarchyParams) -> CountryNode {
    let sectors = if params.expand_sectors && !record.country.starts_with(REMAINDER_PREFIX) {
        normalize_shares(&record.sectors, params.sector_threshold)
            .into_iter()
            .map(|(sector, share)| SectorSlice { sector, share, value: record.gdp * share })
            .collect()
    } else {
        Vec::new()
    };

    CountryNode {
        name: record.country.clone(),
        continent: record.continent_key().to_string(),
        gdp: record.gdp,
        indicators: Indicators {
            unemployment: record.unemployment,
            inflation: record.inflation,
        },
        gdp_per_capita: record.gdp_per_capita,
        sectors,
    }
}

fn remainder_node(continent: &str, excluded: &[&Record]) -> AggregateRemainder {
    AggregateRemainder {
        label: format!("{REMAINDER_PREFIX}{continent})"),
        continent: continent.to_string(),
        gdp: excluded.iter().map(|r| r.gdp).sum(),
        count: excluded.len(),
        indicators: Indicators {
            unemployment: mean(excluded.iter().map(|r| r.unemployment)),
            inflation: mean(excluded.iter().map(|r| r.inflation)),
        },
    }
}

/// Descending GDP, then country name; stable for full ties.
pub(crate) fn rank_by_gdp(records: &mut [&Record]) {
    records.sort_by(|a, b| b.gdp.total_cmp(&a.gdp).then_with(|| a.country.cmp(&b.country)));
}

/// Build the full tree for one filter state.
///
/// Continents are ordered by name. An empty selection yields a root with no
/// children, which callers render as "nothing to show".
#[tracing::instrument(skip_all, fields(year = filter.year))]
pub fn build_hierarchy(records: &[Record], filter: &FilterState, params: &HierarchyParams) -> Root {
    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in records.iter().filter(|r| filter.admits(r)) {
        groups.entry(record.continent_key()).or_default().push(record);
    }

    if groups.is_empty() {
        tracing::debug!("no records in scope");
        return Root::empty(params.root_label.clone());
    }

    let continents = groups
        .into_iter()
        .map(|(name, mut members)| {
            rank_by_gdp(&mut members);
            let cut = members.len().min(params.top_n);
            let (kept, excluded) = members.split_at(cut);

            let mut nodes: Vec<Member> = kept
                .iter()
                .map(|r| Member::Country(country_node(r, params)))
                .collect();
            if !excluded.is_empty() {
                nodes.push(Member::Remainder(remainder_node(name, excluded)));
            }

            tracing::debug!(
                continent = name,
                kept = kept.len(),
                folded = excluded.len(),
                "continent ranked"
            );
            ContinentGroup { name: name.to_string(), members: nodes }
        })
        .collect();

    Root { label: params.root_label.clone(), continents }
}
