//! Changelog assembly over grouped series.
//!
//! [`ChangelogStrategy`] turns release batches into [`Series`](crate::model::Series),
//! [`ChangelogAssembler`] folds each series into a [`Changelog`](crate::model::Changelog),
//! and [`generate_changelogs`] runs both over a whole pool.

pub mod assembler;
pub mod pipeline;
pub mod strategy;

pub use assembler::{attach_changelog, merge_by_version, ChangelogAssembler};
pub use pipeline::{generate_changelogs, GenerationOutput, GenerationReport, SkippedSeries};
pub use strategy::{ChangelogStrategy, DeclaredVersionStrategy, DisabledStrategy, IdentityStrategy};
