#![cfg(target_arch = "wasm32")]

use mosaic_wasm::{resolve_source, source_override, MosaicSession};
use wasm_bindgen_test::*;

const CSV: &str = "\
Year,Country Name,Continent Name,GDP,Unemployment,Inflation Rate
2010,France,Europe,2.64e12,9.3,1.5
2010,Kenya,Africa,4.0e10,,4.0
";

#[wasm_bindgen_test]
fn session_lists_years() {
    let session = MosaicSession::new(CSV, None, None).unwrap();
    assert_eq!(session.years(), vec![2010]);
}

#[wasm_bindgen_test]
fn bad_filter_is_rejected() {
    let session = MosaicSession::new(CSV, None, None).unwrap();
    assert!(session.hierarchy("{ not json").is_err());
}

#[wasm_bindgen_test]
fn scene_serializes() {
    let session = MosaicSession::new(CSV, None, Some("?data=x.csv".into())).unwrap();
    assert_eq!(session.source(), "x.csv");
    assert!(session.scene(r#"{ "year": 2010 }"#, 600.0, 400.0).is_ok());
}

#[wasm_bindgen_test]
fn query_override() {
    assert_eq!(source_override("?data=x.csv").as_deref(), Some("x.csv"));
    assert_eq!(resolve_source(None, "").unwrap(), "data/gdp.csv");
}
