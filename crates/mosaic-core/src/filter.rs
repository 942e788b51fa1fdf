//! Selection filter shared by the hierarchy builder and the ranking view.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// Immutable selection: year plus optional country and continent sets.
///
/// An empty set means "no restriction", not "nothing selected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub year: i32,
    pub countries: BTreeSet<String>,
    pub continents: BTreeSet<String>,
}

impl FilterState {
    pub fn new(year: i32) -> Self {
        Self { year, ..Self::default() }
    }

    pub fn with_countries<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_continents<I, S>(mut self, continents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.continents = continents.into_iter().map(Into::into).collect();
        self
    }

    /// The single in-scope predicate.
    pub fn admits(&self, record: &Record) -> bool {
        record.year == Some(self.year)
            && record.qualifies()
            && (self.countries.is_empty() || self.countries.contains(&record.country))
            && (self.continents.is_empty() || self.continents.contains(record.continent_key()))
    }
}

/// Records admitted by `filter`, in input order.
pub fn select<'a>(records: &'a [Record], filter: &FilterState) -> Vec<&'a Record> {
    records.iter().filter(|r| filter.admits(r)).collect()
}
