//! Catalog-driven probing of conventionally located, sensitive user files.
//!
//! Targets are computed from platform base directories, probed one at a time,
//! and every attempt lands in the report as a classified outcome.

pub mod catalog;
pub mod error;
pub mod fs;
pub mod harvest;
pub mod platform;
pub mod probe;
pub mod types;

pub use catalog::{build_catalog, AppIds};
pub use error::ProbeError;
pub use fs::{EntryKind, EntryName, Filesystem, TokioFilesystem};
pub use harvest::{HarvestEntry, HarvestReport, HarvestSummary, Harvester};
pub use platform::{BaseDirs, NamedDir, PathResolver, Platform};
pub use probe::Prober;
pub use types::*;
