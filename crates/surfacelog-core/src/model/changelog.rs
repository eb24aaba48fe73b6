//! Changelog output types.

use crate::model::markers;
use crate::model::version::compare_versions;
use serde_json::{Map, Value};

/// The diff attributed to one version of a series.
///
/// `fields` holds only what changed: `{$old, $new, $changed}` nodes for value
/// fields, reconciled element lists for keyed collections, and nested partial
/// objects for object fields. The genesis entry instead holds a full copy of
/// the oldest record with `added` set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangelogEntry {
    pub version: String,
    pub added: bool,
    pub removed: bool,
    pub fields: Map<String, Value>,
}

impl ChangelogEntry {
    pub fn new(version: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            version: version.into(),
            added: false,
            removed: false,
            fields,
        }
    }

    /// Entry for the oldest version of a series: a full snapshot, `$added`.
    pub fn genesis(version: impl Into<String>, snapshot: Map<String, Value>) -> Self {
        Self {
            added: true,
            ..Self::new(version, snapshot)
        }
    }

    /// Entry for a series that no longer appears from `version` onward.
    pub fn retirement(version: impl Into<String>) -> Self {
        Self {
            removed: true,
            ..Self::new(version, Map::new())
        }
    }

    /// True when the entry reports nothing at all.
    pub fn is_empty(&self) -> bool {
        !self.added && !self.removed && self.fields.is_empty()
    }

    /// Render as `{<version_key>: version, $added?, $removed?, ...fields}`.
    pub fn to_value(&self, version_key: &str) -> Value {
        let mut out = self.fields.clone();
        out.insert(version_key.to_string(), Value::String(self.version.clone()));
        if self.added {
            out.insert(markers::ADDED.to_string(), Value::Bool(true));
        }
        if self.removed {
            out.insert(markers::REMOVED.to_string(), Value::Bool(true));
        }
        Value::Object(out)
    }
}

/// Ordered list of entries for one series, newest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Changelog {
    entries: Vec<ChangelogEntry>,
}

impl Changelog {
    /// Build from entries in any order; they are sorted newest-first.
    pub fn from_entries(mut entries: Vec<ChangelogEntry>) -> Self {
        entries.sort_by(|a, b| compare_versions(&b.version, &a.version));
        Self { entries }
    }

    pub fn entries(&self) -> &[ChangelogEntry] {
        &self.entries
    }

    pub fn entry(&self, version: &str) -> Option<&ChangelogEntry> {
        self.entries.iter().find(|e| e.version == version)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_value(&self, version_key: &str) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|e| e.to_value(version_key))
                .collect(),
        )
    }
}
