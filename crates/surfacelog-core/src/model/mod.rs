//! Records, series, and changelog data types.

pub mod changelog;
pub mod markers;
pub mod record;
pub mod version;

pub use changelog::{Changelog, ChangelogEntry};
pub use record::{ReleaseBatch, Series, VersionedRecord};
pub use version::compare_versions;
