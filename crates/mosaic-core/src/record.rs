//! Record normalizer: raw CSV rows → typed per-country-per-year records.
//!
//! Numeric cells never abort ingestion. Optional indicators degrade to
//! `None`; GDP degrades to `NaN`, which later fails the `gdp > 0` gate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One parsed row: column name → raw cell text. Order is irrelevant.
pub type RawRow = HashMap<String, String>;

/// Continent key used when the continent cell is blank.
pub const UNKNOWN_CONTINENT: &str = "Unknown";

/// Economic sector a GDP share is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sector {
    Agriculture,
    Industry,
    Service,
    Export,
    Import,
}

impl Sector {
    pub const ALL: [Sector; 5] = [
        Sector::Agriculture,
        Sector::Industry,
        Sector::Service,
        Sector::Export,
        Sector::Import,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Sector::Agriculture => "Agriculture",
            Sector::Industry => "Industry",
            Sector::Service => "Service",
            Sector::Export => "Export",
            Sector::Import => "Import",
        }
    }
}

/// Raw sector percentages as they appear in the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorShares {
    pub agriculture: f64,
    pub industry: f64,
    pub service: f64,
    pub export: f64,
    pub import: f64,
}

impl SectorShares {
    pub fn new(agriculture: f64, industry: f64, service: f64, export: f64, import: f64) -> Self {
        Self { agriculture, industry, service, export, import }
    }

    pub fn get(&self, sector: Sector) -> f64 {
        match sector {
            Sector::Agriculture => self.agriculture,
            Sector::Industry => self.industry,
            Sector::Service => self.service,
            Sector::Export => self.export,
            Sector::Import => self.import,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Sector, f64)> + '_ {
        Sector::ALL.iter().map(move |&s| (s, self.get(s)))
    }
}

/// Canonical record: one country in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// `None` when the year cell is not an integral number.
    pub year: Option<i32>,
    pub country: String,
    pub continent: String,
    /// `NaN` when the GDP cell failed numeric coercion.
    pub gdp: f64,
    pub unemployment: Option<f64>,
    pub inflation: Option<f64>,
    pub sectors: SectorShares,
    pub gdp_per_capita: Option<f64>,
    pub education_expenditure: Option<f64>,
    pub health_expenditure: Option<f64>,
}

impl Record {
    pub fn new(year: i32, country: impl Into<String>, continent: impl Into<String>, gdp: f64) -> Self {
        Self {
            year: Some(year),
            country: country.into(),
            continent: continent.into(),
            gdp,
            unemployment: None,
            inflation: None,
            sectors: SectorShares::default(),
            gdp_per_capita: None,
            education_expenditure: None,
            health_expenditure: None,
        }
    }

    pub fn with_unemployment(mut self, rate: f64) -> Self {
        self.unemployment = Some(rate);
        self
    }

    pub fn with_inflation(mut self, rate: f64) -> Self {
        self.inflation = Some(rate);
        self
    }

    pub fn with_sectors(mut self, sectors: SectorShares) -> Self {
        self.sectors = sectors;
        self
    }

    /// Grouping key; blank continents collapse into [`UNKNOWN_CONTINENT`].
    pub fn continent_key(&self) -> &str {
        if self.continent.is_empty() {
            UNKNOWN_CONTINENT
        } else {
            &self.continent
        }
    }

    /// True when the record may appear in any downstream view.
    pub fn qualifies(&self) -> bool {
        !self.country.is_empty() && self.gdp.is_finite() && self.gdp > 0.0
    }
}

/// Header names for each record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub year: String,
    pub country: String,
    pub continent: String,
    pub gdp: String,
    pub unemployment: String,
    pub inflation: String,
    pub agriculture: String,
    pub industry: String,
    pub service: String,
    pub export: String,
    pub import: String,
    pub gdp_per_capita: String,
    pub education_expenditure: String,
    pub health_expenditure: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            year: "Year".into(),
            country: "Country Name".into(),
            continent: "Continent Name".into(),
            gdp: "GDP".into(),
            unemployment: "Unemployment".into(),
            inflation: "Inflation Rate".into(),
            agriculture: "Agriculture".into(),
            industry: "Industry".into(),
            service: "Service".into(),
            export: "Export".into(),
            import: "Import".into(),
            gdp_per_capita: "GDP Per Capita".into(),
            education_expenditure: "Education Expenditure".into(),
            health_expenditure: "Health Expenditure".into(),
        }
    }
}

impl ColumnMap {
    /// Columns without which no record can qualify.
    pub fn required(&self) -> [&str; 3] {
        [&self.year, &self.country, &self.gdp]
    }
}

// ── Cell coercion ─────────────────────────────────────────────────────────────

fn cell<'a>(row: &'a RawRow, column: &str) -> &'a str {
    row.get(column).map(|s| s.trim()).unwrap_or("")
}

/// Optional numeric field: blank or unparsable → `None`.
pub fn parse_optional(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Mandatory numeric field: always coerced, `NaN` on failure.
pub fn parse_coerced(raw: &str) -> f64 {
    parse_optional(raw).unwrap_or(f64::NAN)
}

fn parse_year(raw: &str) -> Option<i32> {
    let v = parse_coerced(raw);
    if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

/// Normalize one raw row. Rows whose cells are all blank are rejected.
pub fn normalize_row(row: &RawRow, columns: &ColumnMap) -> Option<Record> {
    if row.values().all(|v| v.trim().is_empty()) {
        return None;
    }

    let continent = cell(row, &columns.continent);
    let sector = |column: &str| parse_optional(cell(row, column)).unwrap_or(0.0);

    let record = Record {
        year: parse_year(cell(row, &columns.year)),
        country: cell(row, &columns.country).to_string(),
        continent: if continent.is_empty() {
            UNKNOWN_CONTINENT.to_string()
        } else {
            continent.to_string()
        },
        gdp: parse_coerced(cell(row, &columns.gdp)),
        unemployment: parse_optional(cell(row, &columns.unemployment)),
        inflation: parse_optional(cell(row, &columns.inflation)),
        sectors: SectorShares {
            agriculture: sector(&columns.agriculture),
            industry: sector(&columns.industry),
            service: sector(&columns.service),
            export: sector(&columns.export),
            import: sector(&columns.import),
        },
        gdp_per_capita: parse_optional(cell(row, &columns.gdp_per_capita)),
        education_expenditure: parse_optional(cell(row, &columns.education_expenditure)),
        health_expenditure: parse_optional(cell(row, &columns.health_expenditure)),
    };

    if record.gdp.is_nan() {
        tracing::trace!(country = %record.country, "gdp failed numeric coercion");
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn well_formed_row_is_fully_typed() {
        let r = row(&[
            ("Year", "2015"),
            ("Country Name", "Chile"),
            ("Continent Name", "South America"),
            ("GDP", "2.43e11"),
            ("Unemployment", "6.2"),
            ("Inflation Rate", "4.3"),
            ("Agriculture", "4"),
            ("Industry", "31"),
            ("Service", "65"),
            ("Export", "29"),
            ("Import", "30"),
            ("GDP Per Capita", "13500"),
        ]);
        let rec = normalize_row(&r, &ColumnMap::default()).unwrap();
        assert_eq!(rec.year, Some(2015));
        assert_eq!(rec.country, "Chile");
        assert_eq!(rec.continent, "South America");
        assert_eq!(rec.gdp, 2.43e11);
        assert_eq!(rec.unemployment, Some(6.2));
        assert_eq!(rec.sectors.service, 65.0);
        assert_eq!(rec.gdp_per_capita, Some(13500.0));
        assert_eq!(rec.health_expenditure, None);
        assert!(rec.qualifies());
    }

    #[test]
    fn malformed_numbers_degrade_instead_of_failing() {
        let r = row(&[
            ("Year", "2015"),
            ("Country Name", "Atlantis"),
            ("GDP", "n/a"),
            ("Unemployment", ""),
            ("Inflation Rate", "high"),
            ("Industry", "lots"),
        ]);
        let rec = normalize_row(&r, &ColumnMap::default()).unwrap();
        assert!(rec.gdp.is_nan());
        assert_eq!(rec.unemployment, None);
        assert_eq!(rec.inflation, None);
        assert_eq!(rec.sectors.industry, 0.0);
        assert!(!rec.qualifies());
    }

    #[test]
    fn blank_continent_becomes_unknown() {
        let r = row(&[("Year", "2000"), ("Country Name", "X"), ("GDP", "10")]);
        let rec = normalize_row(&r, &ColumnMap::default()).unwrap();
        assert_eq!(rec.continent, UNKNOWN_CONTINENT);
    }

    #[test]
    fn non_integral_year_matches_nothing() {
        let r = row(&[("Year", "2000.5"), ("Country Name", "X"), ("GDP", "10")]);
        let rec = normalize_row(&r, &ColumnMap::default()).unwrap();
        assert_eq!(rec.year, None);
    }

    #[test]
    fn all_blank_row_is_rejected() {
        let r = row(&[("Year", " "), ("Country Name", ""), ("GDP", "")]);
        assert!(normalize_row(&r, &ColumnMap::default()).is_none());
    }

    #[test]
    fn zero_and_negative_gdp_do_not_qualify() {
        assert!(!Record::new(2000, "A", "Asia", 0.0).qualifies());
        assert!(!Record::new(2000, "A", "Asia", -5.0).qualifies());
        assert!(!Record::new(2000, "", "Asia", 5.0).qualifies());
    }
}
