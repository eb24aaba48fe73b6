//! Declarative record layouts.
//!
//! A [`SchemaLayout`] tells the diff engine how to walk one record kind: which
//! fields it compares, which of them are nested objects, and which are keyed
//! collections reconciled element by element. Layouts are built once at
//! startup (usually into a [`LayoutRegistry`]) and never mutated.
//!
//! ```
//! use surfacelog_core::layout::{members, SchemaLayout};
//!
//! let class_layout = SchemaLayout::object(
//!     "name",
//!     members([
//!         ("description", SchemaLayout::value()),
//!         ("tags", SchemaLayout::simple_ordered_array("name")),
//!         (
//!             "members",
//!             SchemaLayout::array_of(
//!                 "name",
//!                 members([("security", SchemaLayout::value_ignoring(["docs"]))]),
//!             ),
//!         ),
//!     ]),
//! );
//! assert!(class_layout.submembers().is_some());
//! ```

pub mod registry;

pub use registry::LayoutRegistry;

use std::collections::{BTreeMap, BTreeSet};

/// Field name → layout of that field.
pub type Submembers = BTreeMap<String, SchemaLayout>;

/// How one field (or one whole record) is compared between two versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaLayout {
    /// Compared as a whole by deep equality after stripping `ignored_subfields`
    /// at every depth.
    Value { ignored_subfields: BTreeSet<String> },
    /// A nested object whose declared submembers are diffed recursively.
    Object {
        identity_key: String,
        submembers: Submembers,
    },
    /// A keyed collection reconciled element by element.
    Array {
        identity_key: String,
        submembers: Option<Submembers>,
    },
    /// A keyed collection reconciled element by element that is also recorded
    /// as a whole-value snapshot when it changes.
    ArrayWithSnapshot {
        identity_key: String,
        submembers: Option<Submembers>,
    },
    /// An ordered list recorded only as a whole-value snapshot.
    SimpleOrderedArray { identity_key: String },
}

impl SchemaLayout {
    /// Plain value field.
    pub fn value() -> Self {
        SchemaLayout::Value {
            ignored_subfields: BTreeSet::new(),
        }
    }

    /// Value field whose named subfields never count as a change.
    pub fn value_ignoring<I, S>(ignored: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaLayout::Value {
            ignored_subfields: ignored.into_iter().map(Into::into).collect(),
        }
    }

    pub fn object(identity_key: impl Into<String>, submembers: Submembers) -> Self {
        SchemaLayout::Object {
            identity_key: identity_key.into(),
            submembers,
        }
    }

    /// Keyed collection without per-element recursion.
    pub fn array(identity_key: impl Into<String>) -> Self {
        SchemaLayout::Array {
            identity_key: identity_key.into(),
            submembers: None,
        }
    }

    /// Keyed collection whose elements are diffed with `submembers`.
    pub fn array_of(identity_key: impl Into<String>, submembers: Submembers) -> Self {
        SchemaLayout::Array {
            identity_key: identity_key.into(),
            submembers: Some(submembers),
        }
    }

    pub fn array_with_snapshot(
        identity_key: impl Into<String>,
        submembers: Option<Submembers>,
    ) -> Self {
        SchemaLayout::ArrayWithSnapshot {
            identity_key: identity_key.into(),
            submembers,
        }
    }

    pub fn simple_ordered_array(identity_key: impl Into<String>) -> Self {
        SchemaLayout::SimpleOrderedArray {
            identity_key: identity_key.into(),
        }
    }

    /// Identity key of this layout, `None` for `Value`.
    pub fn identity_key(&self) -> Option<&str> {
        match self {
            SchemaLayout::Value { .. } => None,
            SchemaLayout::Object { identity_key, .. }
            | SchemaLayout::Array { identity_key, .. }
            | SchemaLayout::ArrayWithSnapshot { identity_key, .. }
            | SchemaLayout::SimpleOrderedArray { identity_key } => Some(identity_key),
        }
    }

    /// Declared submembers, if this layout recurses.
    pub fn submembers(&self) -> Option<&Submembers> {
        match self {
            SchemaLayout::Object { submembers, .. } => Some(submembers),
            SchemaLayout::Array { submembers, .. }
            | SchemaLayout::ArrayWithSnapshot { submembers, .. } => submembers.as_ref(),
            SchemaLayout::Value { .. } | SchemaLayout::SimpleOrderedArray { .. } => None,
        }
    }

    /// Short variant name, used in error messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            SchemaLayout::Value { .. } => "value",
            SchemaLayout::Object { .. } => "object",
            SchemaLayout::Array { .. } => "array",
            SchemaLayout::ArrayWithSnapshot { .. } => "array_with_snapshot",
            SchemaLayout::SimpleOrderedArray { .. } => "simple_ordered_array",
        }
    }
}

/// Build a [`Submembers`] map from `(field, layout)` pairs.
pub fn members<I, S>(fields: I) -> Submembers
where
    I: IntoIterator<Item = (S, SchemaLayout)>,
    S: Into<String>,
{
    fields
        .into_iter()
        .map(|(name, layout)| (name.into(), layout))
        .collect()
}

/// Field name under which an `ArrayWithSnapshot` field's whole-collection
/// snapshot is recorded.
pub fn snapshot_field_name(field: &str) -> String {
    format!("{}$snapshot", field)
}
