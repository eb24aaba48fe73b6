//! Surfacelog Core - changelog engine for versioned API-surface snapshots
//!
//! This crate computes, for every entity in a set of release batches, a
//! per-version list of what was added, removed, or changed, including:
//! - Schema layouts describing how each field of a record is compared
//! - Order-preserving reconciliation of keyed collections (LCS based)
//! - A layout-driven structural diff engine with explicit attribution passes
//! - Changelog assembly per series, pluggable grouping strategies, and a
//!   batch pipeline that never aborts on one bad series

pub mod changelog;
pub mod config;
pub mod diff;
pub mod errors;
pub mod layout;
pub mod logging_facility;
pub mod model;

// Re-export commonly used types
pub use changelog::{
    generate_changelogs, ChangelogAssembler, ChangelogStrategy, DeclaredVersionStrategy,
    DisabledStrategy, GenerationOutput, GenerationReport, IdentityStrategy,
};
pub use config::{ChangelogConfig, StrategyKind};
pub use errors::{ExError, ExErrorKind, Result, SurfacelogError};
pub use layout::{LayoutRegistry, SchemaLayout};
pub use model::{Changelog, ChangelogEntry, ReleaseBatch, Series, VersionedRecord};
