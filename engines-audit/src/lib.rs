#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod contents;
pub mod engines;
pub mod results;
pub mod search;

pub use contents::{ContentsError, ContentsFetcher};
pub use engines::{match_engines, parse_manifest, EngineEntry, PackageManifest};
pub use results::{Outcome, ResultSet};
pub use search::{
    BatchError, BatchOptions, EnginesSearch, RepoBatch, SearchConfig, SearchError,
};
