//! Runtime configuration, loaded from JSON with every key optional.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file (`--config` / wasm `config_json`)
//! 3. Source-location override from the query string or `--data`

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encode::{LabelPolicy, OpacityScale};
use crate::error::{MosaicError, MosaicResult};
use crate::hierarchy::HierarchyParams;
use crate::partition::Squarified;
use crate::record::ColumnMap;
use crate::scene::StrokeStyle;

/// Default data file location.
pub const DEFAULT_SOURCE: &str = "data/gdp.csv";

/// Query keys accepted as the source-location override.
const SOURCE_KEYS: [&str; 2] = ["data", "src"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    pub hierarchy: HierarchyParams,
    pub opacity: OpacityScale,
    pub labels: LabelPolicy,
    pub stroke: StrokeStyle,
    pub layout: Squarified,
    pub columns: ColumnMap,
    pub delimiter: char,
    pub source: String,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            hierarchy: HierarchyParams::default(),
            opacity: OpacityScale::default(),
            labels: LabelPolicy::default(),
            stroke: StrokeStyle::default(),
            layout: Squarified::default(),
            columns: ColumnMap::default(),
            delimiter: ',',
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

impl MosaicConfig {
    pub fn from_json_str(json: &str) -> MosaicResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> MosaicResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_json_str(&text)
    }

    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> MosaicResult<()> {
        if !self.delimiter.is_ascii() {
            return Err(MosaicError::config(format!(
                "delimiter {:?} must be a single ASCII character",
                self.delimiter
            )));
        }
        let threshold = self.hierarchy.sector_threshold;
        if threshold.is_nan() || threshold < 0.0 {
            return Err(MosaicError::config("hierarchy.sector_threshold must be >= 0"));
        }
        let padding = self.layout.padding;
        if !padding.is_finite() || padding < 0.0 {
            return Err(MosaicError::config("layout.padding must be a finite value >= 0"));
        }
        if self.labels.value_min_area < self.labels.name_min_area {
            return Err(MosaicError::config(
                "labels.value_min_area must not be below labels.name_min_area",
            ));
        }
        Ok(())
    }

    /// Replace `source` when the query string names one.
    pub fn apply_query(&mut self, query: &str) {
        if let Some(src) = source_from_query(query) {
            tracing::info!(source = %src, "source overridden from query");
            self.source = src;
        }
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}

/// Extract the data-source override from a URL query string.
///
/// Accepts a leading `?`, `&`-separated pairs, `+` as space and `%XX`
/// escapes. Empty values are ignored.
pub fn source_from_query(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| SOURCE_KEYS.contains(k))
        .map(|(_, v)| percent_decode(v))
        .filter(|v| !v.is_empty())
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len()
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit() =>
            {
                let hi = (bytes[i + 1] as char).to_digit(16).unwrap_or(0) as u8;
                let lo = (bytes[i + 2] as char).to_digit(16).unwrap_or(0) as u8;
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let cfg = MosaicConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, MosaicConfig::default());
        assert_eq!(cfg.hierarchy.top_n, 9);
        assert_eq!(cfg.opacity.base_rate, 4.0);
        assert_eq!(cfg.opacity.max_rate, 15.0);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = MosaicConfig::from_json_str(
            r#"{ "hierarchy": { "top_n": 5 }, "opacity": { "fallback": 0.15 }, "delimiter": ";" }"#,
        )
        .unwrap();
        assert_eq!(cfg.hierarchy.top_n, 5);
        assert_eq!(cfg.hierarchy.root_label, "World");
        assert_eq!(cfg.opacity.fallback, 0.15);
        assert_eq!(cfg.opacity.max_opacity, 0.3);
        assert_eq!(cfg.delimiter_byte(), b';');
    }

    #[test]
    fn layout_padding_is_configurable_and_validated() {
        let cfg = MosaicConfig::from_json_str(r#"{ "layout": { "padding": 2.5 } }"#).unwrap();
        assert_eq!(cfg.layout.padding, 2.5);
        let err = MosaicConfig::from_json_str(r#"{ "layout": { "padding": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, MosaicError::Config(_)));
    }

    #[test]
    fn invalid_settings_are_config_errors() {
        let err = MosaicConfig::from_json_str(r#"{ "delimiter": "é" }"#).unwrap_err();
        assert!(matches!(err, MosaicError::Config(_)));
        let err = MosaicConfig::from_json_str(
            r#"{ "labels": { "name_min_area": 100.0, "value_min_area": 10.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, MosaicError::Config(_)));
    }

    #[test]
    fn malformed_json_is_a_serde_error() {
        let err = MosaicConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, MosaicError::Serde(_)));
    }

    #[test]
    fn query_override_decodes_value() {
        assert_eq!(
            source_from_query("?year=2010&data=https%3A%2F%2Fexample.org%2Fgdp+2020.csv"),
            Some("https://example.org/gdp 2020.csv".to_string())
        );
        assert_eq!(source_from_query("src=local.csv"), Some("local.csv".to_string()));
        assert_eq!(source_from_query("?data="), None);
        assert_eq!(source_from_query(""), None);
        assert_eq!(source_from_query("?data=100%"), Some("100%".to_string()));
    }

    #[test]
    fn apply_query_only_overrides_when_present() {
        let mut cfg = MosaicConfig::default();
        cfg.apply_query("?year=2001");
        assert_eq!(cfg.source, DEFAULT_SOURCE);
        cfg.apply_query("?data=other.csv");
        assert_eq!(cfg.source, "other.csv");
    }
}
