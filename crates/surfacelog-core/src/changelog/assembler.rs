//! Per-series changelog assembly.
//!
//! ## Attribution
//!
//! 1. The oldest version gets a genesis entry: a full copy, `$added`.
//! 2. Additions fold, newest to oldest: each `(older, newer)` pair is diffed
//!    walking the newer side and reported against the **newer** version.
//! 3. Removals fold, oldest to newest: each pair is diffed walking the older
//!    side and reported against the **older** version.
//! 4. All entries are merged by version, empty entries dropped, and the list
//!    sorted newest-first.

use crate::diff::{diff_engine, expand_ordered_arrays, merge_members, Pass};
use crate::errors::{Result, SurfacelogError};
use crate::layout::{SchemaLayout, Submembers};
use crate::model::{Changelog, ChangelogEntry, Series, VersionedRecord};
use crate::{log_op_end, log_op_error, log_op_start};

/// Drives the diff engine across one series.
#[derive(Debug, Clone)]
pub struct ChangelogAssembler<'a> {
    layout: &'a SchemaLayout,
    version_key: &'a str,
    expand_ordered_arrays: bool,
}

impl<'a> ChangelogAssembler<'a> {
    /// `layout` must be the record-level `Object` layout of the series' kind.
    pub fn new(layout: &'a SchemaLayout, version_key: &'a str) -> Self {
        Self {
            layout,
            version_key,
            expand_ordered_arrays: true,
        }
    }

    /// Whether `SimpleOrderedArray` snapshots get a `$diff` expansion.
    pub fn with_expand_ordered_arrays(mut self, expand: bool) -> Self {
        self.expand_ordered_arrays = expand;
        self
    }

    pub fn version_key(&self) -> &str {
        self.version_key
    }

    /// Build the changelog of `series`.
    ///
    /// # Errors
    ///
    /// - `LayoutMismatch` — the layout is not an `Object` layout
    /// - `MissingVersionKey` — a record has no string under the version key
    pub fn assemble(&self, series: &Series) -> Result<Changelog> {
        log_op_start!("assemble_changelog", series_id = series.identity());
        let start = std::time::Instant::now();

        let changelog = self.assemble_impl(series).map_err(|e| {
            log_op_error!(
                "assemble_changelog",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                series_id = series.identity()
            );
            e
        })?;

        log_op_end!(
            "assemble_changelog",
            duration_ms = start.elapsed().as_millis() as u64,
            series_id = series.identity(),
            entry_count = changelog.len()
        );
        Ok(changelog)
    }

    fn assemble_impl(&self, series: &Series) -> Result<Changelog> {
        let submembers = self.record_members(series)?;
        let sorted = series.sorted_records(self.version_key)?;
        let Some((oldest_version, oldest)) = sorted.first() else {
            return Ok(Changelog::default());
        };

        let genesis = ChangelogEntry::genesis(*oldest_version, oldest.fields().clone());
        let retirement = series.retired_in().map(ChangelogEntry::retirement);
        let entries = std::iter::once(genesis)
            .chain(self.fold_additions(&sorted))
            .chain(self.fold_removals(&sorted))
            .chain(retirement);

        let mut merged = merge_by_version(submembers, entries);
        if self.expand_ordered_arrays {
            for entry in &mut merged {
                entry.fields = expand_ordered_arrays(self.layout, &entry.fields);
            }
        }
        merged.retain(|e| !e.is_empty());
        Ok(Changelog::from_entries(merged))
    }

    /// Additions fold over `sorted` (ascending), walked newest to oldest.
    /// Each entry is keyed by the newer version of its pair.
    pub fn fold_additions(&self, sorted: &[(&str, &VersionedRecord)]) -> Vec<ChangelogEntry> {
        sorted
            .windows(2)
            .rev()
            .map(|pair| {
                let (_, older) = pair[0];
                let (newer_version, newer) = pair[1];
                ChangelogEntry::new(
                    newer_version,
                    diff_engine(self.layout, older.fields(), newer.fields(), Pass::Additions),
                )
            })
            .collect()
    }

    /// Removals fold over `sorted` (ascending), walked oldest to newest.
    /// Each entry is keyed by the older version of its pair.
    pub fn fold_removals(&self, sorted: &[(&str, &VersionedRecord)]) -> Vec<ChangelogEntry> {
        sorted
            .windows(2)
            .map(|pair| {
                let (older_version, older) = pair[0];
                let (_, newer) = pair[1];
                ChangelogEntry::new(
                    older_version,
                    diff_engine(self.layout, older.fields(), newer.fields(), Pass::Removals),
                )
            })
            .collect()
    }

    fn record_members(&self, series: &Series) -> Result<&'a Submembers> {
        match self.layout {
            SchemaLayout::Object { submembers, .. } => Ok(submembers),
            other => Err(SurfacelogError::LayoutMismatch {
                series_id: series.identity().to_string(),
                found: other.variant_name().to_string(),
            }),
        }
    }
}

/// Merge entries sharing a version, keeping first-seen order of versions.
///
/// Fields merge with [`merge_members`]; flags are OR-ed.
pub fn merge_by_version(
    submembers: &Submembers,
    entries: impl IntoIterator<Item = ChangelogEntry>,
) -> Vec<ChangelogEntry> {
    let mut merged: Vec<ChangelogEntry> = Vec::new();
    for entry in entries {
        match merged.iter_mut().find(|e| e.version == entry.version) {
            Some(existing) => {
                existing.added |= entry.added;
                existing.removed |= entry.removed;
                let fields = std::mem::take(&mut existing.fields);
                existing.fields = merge_members(submembers, fields, entry.fields);
            }
            None => merged.push(entry),
        }
    }
    merged
}

/// A copy of `record` with `changelog` attached under `field`.
pub fn attach_changelog(
    record: &VersionedRecord,
    changelog: &Changelog,
    field: &str,
    version_key: &str,
) -> VersionedRecord {
    record.with_field(field, changelog.to_value(version_key))
}
