//! GDP mosaic core: turns yearly country records into a ranked
//! World → continent → country → sector tree, and encodes each node's
//! indicators as fill, opacity, border color and labels.
//!
//! Pipeline:
//!   ingest → record normalizer → selection filter →
//!   { hierarchy builder → partitioner → scene ; ranking view }

pub mod config;
pub mod dataset;
pub mod encode;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod ingest;
pub mod partition;
pub mod ranking;
pub mod record;
pub mod scene;

pub use config::MosaicConfig;
pub use dataset::Dataset;
pub use error::{MosaicError, MosaicResult};
pub use filter::FilterState;
pub use hierarchy::{build_hierarchy, Root};
pub use ranking::{leaderboard, top_k};
pub use record::Record;
pub use scene::{compose_scene, Scene};
