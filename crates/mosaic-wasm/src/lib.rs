use mosaic_core::config::source_from_query;
use mosaic_core::partition::{weighted_tree, Partitioner, Rect};
use mosaic_core::ranking::{leaderboard, LeaderboardEntry};
use mosaic_core::scene::Scene;
use mosaic_core::{compose_scene, Dataset, FilterState, MosaicConfig};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_err)
}

fn parse_filter(filter_json: &str) -> Result<FilterState, String> {
    serde_json::from_str(filter_json).map_err(|e| format!("Invalid filter: {e}"))
}

/// Config from optional JSON, with the page query applied on top.
fn startup_config(config_json: Option<&str>, query: Option<&str>) -> Result<MosaicConfig, String> {
    let mut config = match config_json {
        Some(json) => MosaicConfig::from_json_str(json).map_err(|e| format!("Invalid config: {e}"))?,
        None => MosaicConfig::default(),
    };
    if let Some(query) = query {
        config.apply_query(query);
    }
    Ok(config)
}

/// Data-source override from `window.location.search`, read once at startup.
#[wasm_bindgen]
pub fn source_override(query: &str) -> Option<String> {
    source_from_query(query)
}

/// Location the page should fetch: the configured `source`, replaced by a
/// `data`/`src` query parameter when present.
#[wasm_bindgen(js_name = resolveSource)]
pub fn resolve_source(config_json: Option<String>, query: &str) -> Result<String, JsValue> {
    startup_config(config_json.as_deref(), Some(query))
        .map(|c| c.source)
        .map_err(js_err)
}

/// Loaded dataset plus configuration. Every view call rebuilds from scratch.
#[wasm_bindgen]
pub struct MosaicSession {
    dataset: Dataset,
    config: MosaicConfig,
}

impl MosaicSession {
    fn open(csv_text: &str, config_json: Option<&str>, query: Option<&str>) -> Result<Self, String> {
        let config = startup_config(config_json, query)?;
        let dataset = Dataset::from_csv_str(csv_text, &config)
            .map_err(|e| format!("Failed to load data: {e}"))?;
        Ok(Self { dataset, config })
    }

    fn ranked(&self, filter_json: &str, k: usize) -> Result<Vec<LeaderboardEntry>, String> {
        let filter = parse_filter(filter_json)?;
        Ok(leaderboard(&self.dataset.top_k(&filter, k)))
    }

    fn compose(&self, filter_json: &str, width: f64, height: f64) -> Result<Scene, String> {
        let filter = parse_filter(filter_json)?;
        let root = self.dataset.hierarchy(&filter, &self.config.hierarchy);
        let bounds = Rect::new(0.0, 0.0, width, height).to_polygon();
        let partition = self.config.layout.partition(&weighted_tree(&root), &bounds);
        Ok(compose_scene(&root, &partition, &self.config))
    }
}

#[wasm_bindgen]
impl MosaicSession {
    /// Parse CSV text. `config_json` may be omitted for defaults; `query` is
    /// the page's `location.search`, applied over the config's `source`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        csv_text: &str,
        config_json: Option<String>,
        query: Option<String>,
    ) -> Result<MosaicSession, JsValue> {
        Self::open(csv_text, config_json.as_deref(), query.as_deref()).map_err(js_err)
    }

    /// Data location this session was configured with.
    #[wasm_bindgen(getter)]
    pub fn source(&self) -> String {
        self.config.source.clone()
    }

    pub fn years(&self) -> Vec<i32> {
        self.dataset.years()
    }

    pub fn continents(&self) -> Result<JsValue, JsValue> {
        to_js(&self.dataset.continents())
    }

    pub fn countries(&self, year: i32) -> Result<JsValue, JsValue> {
        to_js(&self.dataset.countries(year))
    }

    /// Filter JSON: `{ "year": 2015, "countries": [...], "continents": [...] }`.
    pub fn hierarchy(&self, filter_json: &str) -> Result<JsValue, JsValue> {
        let filter = parse_filter(filter_json).map_err(js_err)?;
        to_js(&self.dataset.hierarchy(&filter, &self.config.hierarchy))
    }

    #[wasm_bindgen(js_name = topK)]
    pub fn top_k(&self, filter_json: &str, k: usize) -> Result<JsValue, JsValue> {
        to_js(&self.ranked(filter_json, k).map_err(js_err)?)
    }

    /// Styled shapes for a `width` × `height` viewport.
    pub fn scene(&self, filter_json: &str, width: f64, height: f64) -> Result<JsValue, JsValue> {
        to_js(&self.compose(filter_json, width, height).map_err(js_err)?)
    }
}
