//! Layout-aware merge of partial diff trees.
//!
//! The additions and removals passes each produce a tree per version; the
//! assembler folds them together here. Keyed collections merge element-wise
//! by identity so an element reported by both passes appears once.

use crate::diff::sequence::identity_of;
use crate::layout::{SchemaLayout, Submembers};
use crate::model::markers;
use serde_json::{Map, Value};

/// Merge `source` into `target` following `submembers`.
///
/// For fields present on both sides: object fields merge recursively, keyed
/// collections merge element-wise, and anything else keeps `target`'s node.
pub fn merge_members(
    submembers: &Submembers,
    mut target: Map<String, Value>,
    source: Map<String, Value>,
) -> Map<String, Value> {
    for (field, incoming) in source {
        let Some(existing) = target.remove(&field) else {
            target.insert(field, incoming);
            continue;
        };
        let merged = match (submembers.get(&field), existing, incoming) {
            (Some(SchemaLayout::Object { submembers, .. }), Value::Object(a), Value::Object(b)) => {
                Value::Object(merge_members(submembers, a, b))
            }
            (
                Some(
                    SchemaLayout::Array {
                        identity_key,
                        submembers,
                    }
                    | SchemaLayout::ArrayWithSnapshot {
                        identity_key,
                        submembers,
                    },
                ),
                Value::Array(a),
                Value::Array(b),
            ) => Value::Array(merge_elements(identity_key, submembers.as_ref(), a, b)),
            (_, existing, _) => existing,
        };
        target.insert(field, merged);
    }
    target
}

/// Merge two reconciled element lists. Elements of `source` whose identity
/// already appears in `target` are merged into it; the rest are appended in
/// order.
///
/// Markers are plain keys, so they accumulate: an element added in a version
/// and removed again when leaving it carries both `$added` and `$removed`.
fn merge_elements(
    identity_key: &str,
    submembers: Option<&Submembers>,
    mut target: Vec<Value>,
    source: Vec<Value>,
) -> Vec<Value> {
    let empty = Submembers::new();
    let submembers = submembers.unwrap_or(&empty);
    for incoming in source {
        let id = element_identity(&incoming, identity_key);
        match target
            .iter()
            .position(|e| element_identity(e, identity_key) == id)
        {
            Some(i) => {
                let existing = std::mem::take(&mut target[i]);
                target[i] = match (existing, incoming) {
                    (Value::Object(a), Value::Object(b)) => {
                        Value::Object(merge_members(submembers, a, b))
                    }
                    (_, incoming) => incoming,
                };
            }
            None => target.push(incoming),
        }
    }
    target
}

/// Identity that also sees through `{"$value": ..}` wrappers of flagged
/// non-object elements.
fn element_identity(element: &Value, identity_key: &str) -> Value {
    match element.as_object() {
        Some(obj) if !obj.contains_key(identity_key) => match obj.get(markers::VALUE) {
            Some(inner) => inner.clone(),
            None => Value::Null,
        },
        _ => identity_of(element, identity_key),
    }
}
