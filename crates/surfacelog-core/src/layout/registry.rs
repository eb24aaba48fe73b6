//! Kind → layout lookup.

use crate::errors::{Result, SurfacelogError};
use crate::layout::SchemaLayout;
use crate::model::VersionedRecord;
use std::collections::BTreeMap;

/// Immutable map from a record's declared kind to its record-level layout.
///
/// Built once before a generation run; every registered layout must be an
/// `Object` layout since records themselves are objects.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    layouts: BTreeMap<String, SchemaLayout>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the layout for `kind`, replacing any earlier registration.
    pub fn with_layout(mut self, kind: impl Into<String>, layout: SchemaLayout) -> Self {
        self.layouts.insert(kind.into(), layout);
        self
    }

    pub fn get(&self, kind: &str) -> Option<&SchemaLayout> {
        self.layouts.get(kind)
    }

    /// Select the layout for `record` by its `kind_field` discriminator.
    ///
    /// # Errors
    ///
    /// `UnknownKind` if the record has no discriminator or no layout is
    /// registered for it.
    pub fn layout_for(&self, record: &VersionedRecord, kind_field: &str) -> Result<&SchemaLayout> {
        let kind = record
            .str_field(kind_field)
            .ok_or_else(|| SurfacelogError::UnknownKind {
                kind: format!("<missing `{}`>", kind_field),
            })?;
        self.get(kind).ok_or_else(|| SurfacelogError::UnknownKind {
            kind: kind.to_string(),
        })
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::members;
    use serde_json::json;

    fn registry() -> LayoutRegistry {
        LayoutRegistry::new().with_layout(
            "Class",
            SchemaLayout::object("name", members([("summary", SchemaLayout::value())])),
        )
    }

    #[test]
    fn test_layout_for_known_kind() {
        let record = VersionedRecord::from_value(json!({"kind": "Class", "name": "Part"})).unwrap();
        let registry = registry();
        let layout = registry.layout_for(&record, "kind").unwrap();
        assert_eq!(layout.variant_name(), "object");
    }

    #[test]
    fn test_layout_for_unknown_kind() {
        let record = VersionedRecord::from_value(json!({"kind": "Enum"})).unwrap();
        let err = registry().layout_for(&record, "kind").unwrap_err();
        assert_eq!(
            err,
            SurfacelogError::UnknownKind {
                kind: "Enum".to_string()
            }
        );
    }

    #[test]
    fn test_layout_for_missing_discriminator() {
        let record = VersionedRecord::from_value(json!({"name": "Part"})).unwrap();
        assert!(registry().layout_for(&record, "kind").is_err());
    }
}
