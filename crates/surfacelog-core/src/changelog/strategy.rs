//! Grouping strategies.
//!
//! A strategy decides which records across a pool of release batches are
//! versions of the same entity, which field orders them, and whether a
//! generation run is worth doing at all.

use crate::errors::SurfacelogError;
use crate::log_series_skipped;
use crate::model::{compare_versions, ReleaseBatch, Series, VersionedRecord};
use std::collections::{BTreeMap, BTreeSet};

/// Pluggable grouping of release batches into series.
pub trait ChangelogStrategy {
    /// Stable name, used in logs and run context.
    fn name(&self) -> &'static str;

    /// Field that orders records within a series.
    fn version_key(&self) -> &str;

    /// Identity used to bucket `record`, or `None` if it cannot be grouped.
    fn group_key(&self, record: &VersionedRecord) -> Option<String>;

    /// Partition every record of `releases` into series.
    fn group_records(&self, releases: &[ReleaseBatch]) -> Vec<Series>;

    /// Whether a generation run over `releases` would produce anything.
    fn should_generate_changelogs(&self, releases: &[ReleaseBatch]) -> bool;
}

/// Buckets by entity identity alone, ignoring which batch a record came from.
///
/// Each record is stamped with its batch's version under `release_version_field`,
/// which then orders the series. An entity missing from the batches after its
/// last appearance is marked retired in the first such batch.
#[derive(Debug, Clone)]
pub struct IdentityStrategy {
    identity_field: String,
    release_version_field: String,
}

impl IdentityStrategy {
    pub fn new(identity_field: impl Into<String>, release_version_field: impl Into<String>) -> Self {
        Self {
            identity_field: identity_field.into(),
            release_version_field: release_version_field.into(),
        }
    }
}

impl Default for IdentityStrategy {
    fn default() -> Self {
        Self::new("uuid", "releaseVersion")
    }
}

impl ChangelogStrategy for IdentityStrategy {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn version_key(&self) -> &str {
        &self.release_version_field
    }

    fn group_key(&self, record: &VersionedRecord) -> Option<String> {
        record.key_field(&self.identity_field)
    }

    fn group_records(&self, releases: &[ReleaseBatch]) -> Vec<Series> {
        let batches = sorted_batches(releases);
        let mut groups: BTreeMap<String, Vec<VersionedRecord>> = BTreeMap::new();
        let mut last_seen: BTreeMap<String, usize> = BTreeMap::new();

        for (index, batch) in batches.iter().enumerate() {
            for record in &batch.records {
                let Some(identity) = self.group_key(record) else {
                    warn_ungroupable(self.name(), &self.identity_field);
                    continue;
                };
                if last_seen.get(&identity) == Some(&index) {
                    tracing::warn!(
                        component = module_path!(),
                        op = "group_records",
                        event = "duplicate_in_batch",
                        series_id = identity.as_str(),
                        version = batch.version.as_str(),
                        "entity appears twice in one release; keeping the first"
                    );
                    continue;
                }
                last_seen.insert(identity.clone(), index);
                groups.entry(identity).or_default().push(
                    record.with_field(
                        self.release_version_field.clone(),
                        serde_json::Value::String(batch.version.clone()),
                    ),
                );
            }
        }

        groups
            .into_iter()
            .map(|(identity, records)| {
                let retired_in = last_seen
                    .get(&identity)
                    .and_then(|&last| batches.get(last + 1))
                    .map(|batch| batch.version.clone());
                let series = Series::new(identity, records);
                match retired_in {
                    Some(version) => series.with_retired_in(version),
                    None => series,
                }
            })
            .collect()
    }

    fn should_generate_changelogs(&self, releases: &[ReleaseBatch]) -> bool {
        releases.len() > 1 || has_duplicate_identities(self, releases)
    }
}

/// Buckets by identity and declared version: the same logical version
/// published in several batches counts once, with the latest batch's copy
/// winning.
#[derive(Debug, Clone)]
pub struct DeclaredVersionStrategy {
    identity_field: String,
    version_field: String,
}

impl DeclaredVersionStrategy {
    pub fn new(identity_field: impl Into<String>, version_field: impl Into<String>) -> Self {
        Self {
            identity_field: identity_field.into(),
            version_field: version_field.into(),
        }
    }
}

impl Default for DeclaredVersionStrategy {
    fn default() -> Self {
        Self::new("uuid", "version")
    }
}

impl ChangelogStrategy for DeclaredVersionStrategy {
    fn name(&self) -> &'static str {
        "declared_version"
    }

    fn version_key(&self) -> &str {
        &self.version_field
    }

    fn group_key(&self, record: &VersionedRecord) -> Option<String> {
        record.key_field(&self.identity_field)
    }

    fn group_records(&self, releases: &[ReleaseBatch]) -> Vec<Series> {
        let mut groups: BTreeMap<String, Vec<VersionedRecord>> = BTreeMap::new();

        for batch in sorted_batches(releases) {
            for record in &batch.records {
                let Some(identity) = self.group_key(record) else {
                    warn_ungroupable(self.name(), &self.identity_field);
                    continue;
                };
                let records = groups.entry(identity).or_default();
                // Records without a declared version are kept so the assembler
                // reports the series as skipped.
                let declared = record.version(&self.version_field);
                let existing = declared.and_then(|v| {
                    records
                        .iter()
                        .position(|r| r.version(&self.version_field) == Some(v))
                });
                match existing {
                    Some(i) => records[i] = record.clone(),
                    None => records.push(record.clone()),
                }
            }
        }

        groups
            .into_iter()
            .map(|(identity, records)| Series::new(identity, records))
            .collect()
    }

    fn should_generate_changelogs(&self, releases: &[ReleaseBatch]) -> bool {
        releases.len() > 1 || has_duplicate_identities(self, releases)
    }
}

/// Performs no grouping; generation never runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStrategy;

impl ChangelogStrategy for DisabledStrategy {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn version_key(&self) -> &str {
        "version"
    }

    fn group_key(&self, _record: &VersionedRecord) -> Option<String> {
        None
    }

    fn group_records(&self, _releases: &[ReleaseBatch]) -> Vec<Series> {
        Vec::new()
    }

    fn should_generate_changelogs(&self, _releases: &[ReleaseBatch]) -> bool {
        false
    }
}

/// Batches in ascending release order. Stable for equal versions.
fn sorted_batches(releases: &[ReleaseBatch]) -> Vec<&ReleaseBatch> {
    let mut batches: Vec<&ReleaseBatch> = releases.iter().collect();
    batches.sort_by(|a, b| compare_versions(&a.version, &b.version));
    batches
}

/// True if any identity occurs more than once across the pool, such as a
/// pre-release and its final release published in the same batch.
fn has_duplicate_identities(strategy: &dyn ChangelogStrategy, releases: &[ReleaseBatch]) -> bool {
    let mut seen = BTreeSet::new();
    releases
        .iter()
        .flat_map(|batch| batch.records.iter())
        .filter_map(|record| strategy.group_key(record))
        .any(|identity| !seen.insert(identity))
}

fn warn_ungroupable(strategy: &str, identity_field: &str) {
    log_series_skipped!(
        "group_records",
        SurfacelogError::MissingIdentity {
            identity_field: identity_field.to_string(),
        },
        strategy = strategy
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(v: Value) -> VersionedRecord {
        VersionedRecord::from_value(v).unwrap()
    }

    fn batch(version: &str, records: Vec<Value>) -> ReleaseBatch {
        ReleaseBatch::new(version, records.into_iter().map(record).collect())
    }

    #[test]
    fn test_identity_strategy_stamps_release_version() {
        let strategy = IdentityStrategy::default();
        let series = strategy.group_records(&[
            batch("2.0.0", vec![json!({"uuid": "a", "doc": "new"})]),
            batch("1.0.0", vec![json!({"uuid": "a", "doc": "old"})]),
        ]);
        assert_eq!(series.len(), 1);
        let versions: Vec<&str> = series[0]
            .records()
            .iter()
            .filter_map(|r| r.str_field("releaseVersion"))
            .collect();
        assert_eq!(versions, vec!["1.0.0", "2.0.0"]);
        assert_eq!(series[0].retired_in(), None);
    }

    #[test]
    fn test_identity_strategy_marks_retirement() {
        let strategy = IdentityStrategy::default();
        let series = strategy.group_records(&[
            batch("1.0.0", vec![json!({"uuid": "a"}), json!({"uuid": "b"})]),
            batch("2.0.0", vec![json!({"uuid": "a"})]),
            batch("3.0.0", vec![json!({"uuid": "a"})]),
        ]);
        let b = series.iter().find(|s| s.identity() == "b").unwrap();
        assert_eq!(b.retired_in(), Some("2.0.0"));
    }

    #[test]
    fn test_declared_version_dedupes_across_batches() {
        let strategy = DeclaredVersionStrategy::default();
        let series = strategy.group_records(&[
            batch("1.0.0", vec![json!({"uuid": "a", "version": "1.0.0", "doc": "first"})]),
            batch("1.1.0", vec![
                json!({"uuid": "a", "version": "1.0.0", "doc": "reissued"}),
                json!({"uuid": "a", "version": "1.1.0"}),
            ]),
        ]);
        assert_eq!(series[0].len(), 2);
        assert_eq!(series[0].records()[0].str_field("doc"), Some("reissued"));
    }

    #[test]
    fn test_gate() {
        let strategy = DeclaredVersionStrategy::default();
        let single = [batch("1.0.0", vec![json!({"uuid": "a", "version": "1.0.0"})])];
        assert!(!strategy.should_generate_changelogs(&single));

        let prerelease = [batch(
            "2.0.0",
            vec![
                json!({"uuid": "a", "version": "2.0.0-beta.1"}),
                json!({"uuid": "a", "version": "2.0.0"}),
            ],
        )];
        assert!(strategy.should_generate_changelogs(&prerelease));
        assert!(!DisabledStrategy.should_generate_changelogs(&prerelease));
        assert!(DisabledStrategy.group_records(&prerelease).is_empty());
    }

    #[test]
    fn test_records_without_identity_are_skipped() {
        let strategy = IdentityStrategy::default();
        let series = strategy.group_records(&[batch("1.0.0", vec![json!({"name": "x"})])]);
        assert!(series.is_empty());
    }
}
