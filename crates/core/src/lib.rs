//! Core types for assetsync
//!
//! This crate holds everything the synchronization pipeline needs that is
//! independent of file watching:
//! - Configuration and validation ([`SyncConfig`])
//! - The raw-tree to derived-tree path transform ([`PathMapper`])
//! - The collaborator seams: the content index that records which derived
//!   artifact came from which raw file ([`ContentIndex`]), and the importer
//!   that produces derived artifacts ([`Importer`])

pub mod config;
pub mod error;
pub mod importer;
pub mod index;
pub mod pathmap;

pub use config::SyncConfig;
pub use error::CoreError;
pub use importer::{CopyImporter, Importer};
pub use index::{ContentIndex, DerivedItem, JsonIndex};
pub use pathmap::PathMapper;
