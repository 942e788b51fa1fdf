//! Top-K GDP leaderboard, computed from the same filter predicate as the
//! hierarchy but independent of its truncation.

use serde::{Deserialize, Serialize};

use crate::encode::format_magnitude;
use crate::filter::FilterState;
use crate::hierarchy::rank_by_gdp;
use crate::record::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankSummary {
    pub name: String,
    pub continent: String,
    pub gdp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based.
    pub rank: usize,
    pub name: String,
    pub continent: String,
    pub formatted_gdp: String,
}

/// The `k` largest economies admitted by `filter`, largest first.
#[tracing::instrument(skip_all, fields(year = filter.year, k = k))]
pub fn top_k(records: &[Record], filter: &FilterState, k: usize) -> Vec<RankSummary> {
    let mut admitted: Vec<&Record> = records.iter().filter(|r| filter.admits(r)).collect();
    rank_by_gdp(&mut admitted);
    tracing::trace!(admitted = admitted.len(), "ranking");

    admitted
        .into_iter()
        .take(k)
        .map(|r| RankSummary {
            name: r.country.clone(),
            continent: r.continent_key().to_string(),
            gdp: r.gdp,
        })
        .collect()
}

pub fn leaderboard(summaries: &[RankSummary]) -> Vec<LeaderboardEntry> {
    summaries
        .iter()
        .enumerate()
        .map(|(i, s)| LeaderboardEntry {
            rank: i + 1,
            name: s.name.clone(),
            continent: s.continent.clone(),
            formatted_gdp: format_magnitude(s.gdp),
        })
        .collect()
}
