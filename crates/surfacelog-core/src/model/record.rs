//! Versioned records, release batches, and series.

use crate::errors::{Result, SurfacelogError};
use crate::model::version::compare_versions;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One whole-document snapshot of an entity.
///
/// The record is an arbitrary JSON object; its version, identity, and kind
/// live in ordinary fields named by configuration. Records are never mutated
/// in place: helpers that change a field return a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionedRecord {
    fields: Map<String, Value>,
}

impl VersionedRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// `InvalidRecord` if `value` is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(SurfacelogError::InvalidRecord {
                message: format!("record must be a JSON object, got {}", kind_of(&other)),
            }),
        }
    }

    /// Parse a record from a JSON document.
    ///
    /// # Errors
    ///
    /// `Serialization` on malformed JSON; `InvalidRecord` if the document is
    /// not an object.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(value)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String value of `field`, if it holds a string.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Value of `field` as a grouping key. Strings are taken as-is and
    /// numbers are rendered; anything else is not a key.
    pub fn key_field(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Version string under `version_key`.
    pub fn version(&self, version_key: &str) -> Option<&str> {
        self.str_field(version_key)
    }

    /// A copy of this record with `field` set to `value`.
    pub fn with_field(&self, field: impl Into<String>, value: Value) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(field.into(), value);
        Self { fields }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Records published together under one release version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseBatch {
    pub version: String,
    pub records: Vec<VersionedRecord>,
}

impl ReleaseBatch {
    pub fn new(version: impl Into<String>, records: Vec<VersionedRecord>) -> Self {
        Self {
            version: version.into(),
            records,
        }
    }
}

/// All known versions of one logically-identical entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    identity: String,
    records: Vec<VersionedRecord>,
    retired_in: Option<String>,
}

impl Series {
    pub fn new(identity: impl Into<String>, records: Vec<VersionedRecord>) -> Self {
        Self {
            identity: identity.into(),
            records,
            retired_in: None,
        }
    }

    /// Mark the series as absent from release `version` onward.
    pub fn with_retired_in(mut self, version: impl Into<String>) -> Self {
        self.retired_in = Some(version.into());
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn records(&self) -> &[VersionedRecord] {
        &self.records
    }

    pub fn retired_in(&self) -> Option<&str> {
        self.retired_in.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted ascending by `version_key`. The sort is stable, so
    /// records sharing a version keep their input order.
    ///
    /// # Errors
    ///
    /// `MissingVersionKey` if any record lacks a string under `version_key`.
    pub fn sorted_records(&self, version_key: &str) -> Result<Vec<(&str, &VersionedRecord)>> {
        let mut sorted = self
            .records
            .iter()
            .map(|record| {
                record
                    .version(version_key)
                    .map(|v| (v, record))
                    .ok_or_else(|| SurfacelogError::MissingVersionKey {
                        series_id: self.identity.clone(),
                        version_key: version_key.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        sorted.sort_by(|a, b| compare_versions(a.0, b.0));
        Ok(sorted)
    }

    /// The newest record, which carries the series' changelog.
    ///
    /// # Errors
    ///
    /// `MissingVersionKey` if any record lacks a version; `InvalidRecord` if
    /// the series is empty.
    pub fn representative(&self, version_key: &str) -> Result<&VersionedRecord> {
        self.sorted_records(version_key)?
            .last()
            .map(|(_, record)| *record)
            .ok_or_else(|| SurfacelogError::InvalidRecord {
                message: format!("series {} has no records", self.identity),
            })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
