//! Loaded record collection plus the catalog queries that populate the
//! year slider and the country / continent pickers.

use std::collections::BTreeSet;
use std::path::Path;

use crate::config::MosaicConfig;
use crate::error::MosaicResult;
use crate::filter::FilterState;
use crate::hierarchy::{build_hierarchy, HierarchyParams, Root};
use crate::ingest;
use crate::ranking::{top_k, RankSummary};
use crate::record::Record;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn from_csv_str(text: &str, cfg: &MosaicConfig) -> MosaicResult<Self> {
        ingest::parse_records(text, cfg).map(Self::new)
    }

    pub fn load(path: impl AsRef<Path>, cfg: &MosaicConfig) -> MosaicResult<Self> {
        ingest::load_records(path, cfg).map(Self::new)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn qualifying(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.qualifies())
    }

    /// Distinct years with at least one qualifying record, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.qualifying()
            .filter_map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        let years = self.years();
        Some((*years.first()?, *years.last()?))
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.year_range().map(|(_, hi)| hi)
    }

    /// Distinct continent keys, sorted.
    pub fn continents(&self) -> Vec<String> {
        self.qualifying()
            .map(|r| r.continent_key().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct country names qualifying in `year`, sorted.
    pub fn countries(&self, year: i32) -> Vec<String> {
        self.qualifying()
            .filter(|r| r.year == Some(year))
            .map(|r| r.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn hierarchy(&self, filter: &FilterState, params: &HierarchyParams) -> Root {
        build_hierarchy(&self.records, filter, params)
    }

    pub fn top_k(&self, filter: &FilterState, k: usize) -> Vec<RankSummary> {
        top_k(&self.records, filter, k)
    }
}
