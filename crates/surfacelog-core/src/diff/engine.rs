//! Layout-driven structural diff.
//!
//! The entry point is [`diff_engine`], which compares two versions of a
//! record field by field as declared in a [`SchemaLayout`] and returns a
//! partial tree holding only what changed. Fields the layout does not
//! declare are neither diffed nor copied.
//!
//! A comparison runs in one of two passes. The additions pass walks the
//! newer side: elements missing from the older side are flagged `$added`,
//! and value changes and snapshots are recorded. The removals pass walks the
//! older side and records only elements missing from the newer side, flagged
//! `$removed`. Both passes recurse into elements present on both sides.

use crate::diff::sequence::{diff_array, flag, identity_of};
use crate::errors::{ExError, SurfacelogError};
use crate::layout::{snapshot_field_name, SchemaLayout, Submembers};
use crate::model::markers;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Direction of one comparison between two consecutive versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Walk the newer side; report additions and changes.
    Additions,
    /// Walk the older side; report removals.
    Removals,
}

impl Pass {
    /// Marker applied to elements found only on the walked side.
    pub fn marker(self) -> &'static str {
        match self {
            Pass::Additions => markers::ADDED,
            Pass::Removals => markers::REMOVED,
        }
    }

    fn records_changes(self) -> bool {
        self == Pass::Additions
    }
}

/// Diff two versions of an object against `layout`'s submembers.
///
/// Layouts without submembers produce an empty result.
pub fn diff_engine(
    layout: &SchemaLayout,
    older: &Map<String, Value>,
    newer: &Map<String, Value>,
    pass: Pass,
) -> Map<String, Value> {
    match layout.submembers() {
        Some(submembers) => diff_members(submembers, older, newer, pass),
        None => Map::new(),
    }
}

/// Diff every declared field of two objects.
pub fn diff_members(
    submembers: &Submembers,
    older: &Map<String, Value>,
    newer: &Map<String, Value>,
    pass: Pass,
) -> Map<String, Value> {
    let mut out = Map::new();
    for (field, layout) in submembers {
        for (key, node) in diff_field(field, layout, older.get(field), newer.get(field), pass) {
            out.insert(key, node);
        }
    }
    out
}

/// Diff one field. Returns the `(key, node)` pairs to record, usually zero
/// or one; a changed `ArrayWithSnapshot` field yields its snapshot too.
fn diff_field(
    field: &str,
    layout: &SchemaLayout,
    older: Option<&Value>,
    newer: Option<&Value>,
    pass: Pass,
) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    match layout {
        SchemaLayout::Value { ignored_subfields } => {
            if pass.records_changes() {
                if let Some(node) = diff_value(ignored_subfields, older, newer) {
                    out.push((field.to_string(), node));
                }
            }
        }
        SchemaLayout::Object {
            identity_key,
            submembers,
        } => {
            if let Some(node) = diff_object(identity_key, submembers, older, newer, pass) {
                out.push((field.to_string(), node));
            }
        }
        SchemaLayout::Array {
            identity_key,
            submembers,
        } => {
            let elements = diff_object_or_array(
                field,
                identity_key,
                submembers.as_ref(),
                as_list(older),
                as_list(newer),
                pass,
            );
            if !elements.is_empty() {
                out.push((field.to_string(), Value::Array(elements)));
            }
        }
        SchemaLayout::ArrayWithSnapshot {
            identity_key,
            submembers,
        } => {
            let (old_list, new_list) = (as_list(older), as_list(newer));
            if old_list != new_list {
                if pass.records_changes() {
                    out.push((snapshot_field_name(field), changed_node(older, newer)));
                }
                let elements = diff_object_or_array(
                    field,
                    identity_key,
                    submembers.as_ref(),
                    old_list,
                    new_list,
                    pass,
                );
                if !elements.is_empty() {
                    out.push((field.to_string(), Value::Array(elements)));
                }
            }
        }
        SchemaLayout::SimpleOrderedArray { identity_key } => {
            if pass.records_changes() && as_list(older) != as_list(newer) {
                let mut node = changed_node(older, newer);
                if let Value::Object(obj) = &mut node {
                    obj.insert(markers::KEY.to_string(), Value::String(identity_key.clone()));
                }
                out.push((field.to_string(), node));
            }
        }
    }
    out
}

/// Compare two values after stripping `ignored` subfields at every depth.
///
/// Returns `{$old, $new, $changed: true}` holding the unstripped values when
/// they differ. A side that is absent is left out of the node.
pub fn diff_value(
    ignored: &BTreeSet<String>,
    older: Option<&Value>,
    newer: Option<&Value>,
) -> Option<Value> {
    let same = match (older, newer) {
        (None, None) => true,
        (Some(a), Some(b)) if ignored.is_empty() => a == b,
        (Some(a), Some(b)) => strip_ignored(a, ignored) == strip_ignored(b, ignored),
        _ => false,
    };
    if same {
        None
    } else {
        Some(changed_node(older, newer))
    }
}

/// Deep copy of `value` with every object key in `ignored` removed.
pub fn strip_ignored(value: &Value, ignored: &BTreeSet<String>) -> Value {
    match value {
        Value::Object(obj) => Value::Object(
            obj.iter()
                .filter(|(k, _)| !ignored.contains(k.as_str()))
                .map(|(k, v)| (k.clone(), strip_ignored(v, ignored)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| strip_ignored(v, ignored)).collect())
        }
        other => other.clone(),
    }
}

fn diff_object(
    identity_key: &str,
    submembers: &Submembers,
    older: Option<&Value>,
    newer: Option<&Value>,
    pass: Pass,
) -> Option<Value> {
    match (older.and_then(Value::as_object), newer.and_then(Value::as_object)) {
        (Some(a), Some(b)) => {
            let mut node = diff_members(submembers, a, b, pass);
            if node.is_empty() {
                return None;
            }
            if let Some(id) = b.get(identity_key).or_else(|| a.get(identity_key)) {
                node.insert(identity_key.to_string(), id.clone());
            }
            Some(Value::Object(node))
        }
        // Appeared, disappeared, or not an object on one side.
        _ if pass.records_changes() && older != newer => Some(changed_node(older, newer)),
        _ => None,
    }
}

/// Reconcile a keyed collection element by element.
///
/// Walks the side selected by `pass`. An element with no counterpart is
/// copied in full with the pass marker. An element present on both sides is
/// diffed with `submembers` (or compared whole when there are none); if
/// anything changed, the walked element's full data is kept underneath the
/// diff for context. The first element holding an identity wins; later
/// duplicates are treated as unmatched.
fn diff_object_or_array(
    field: &str,
    identity_key: &str,
    submembers: Option<&Submembers>,
    older: &[Value],
    newer: &[Value],
    pass: Pass,
) -> Vec<Value> {
    let (walked, other) = match pass {
        Pass::Additions => (newer, older),
        Pass::Removals => (older, newer),
    };
    let other_index = index_by_identity(identity_key, other);

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::new();
    for element in walked {
        let id_text = identity_of(element, identity_key).to_string();
        let counterpart = if seen.insert(id_text.clone()) {
            other_index.get(&id_text).map(|&i| &other[i])
        } else {
            warn_collision(field, &id_text);
            None
        };

        let Some(counterpart) = counterpart else {
            out.push(flag(element, pass.marker()));
            continue;
        };

        let (old_el, new_el) = match pass {
            Pass::Additions => (counterpart, element),
            Pass::Removals => (element, counterpart),
        };
        let (Some(old_obj), Some(new_obj), Some(walked_obj)) =
            (old_el.as_object(), new_el.as_object(), element.as_object())
        else {
            continue;
        };

        let node = match submembers {
            Some(sub) => diff_members(sub, old_obj, new_obj, pass),
            None if pass.records_changes() && old_el != new_el => {
                match changed_node(Some(old_el), Some(new_el)) {
                    Value::Object(obj) => obj,
                    _ => Map::new(),
                }
            }
            None => Map::new(),
        };
        if node.is_empty() {
            continue;
        }

        let mut entry = walked_obj.clone();
        entry.extend(node);
        out.push(Value::Object(entry));
    }
    out
}

/// Position of the first element holding each identity. Duplicates on this
/// side are reported when the pass walks it.
fn index_by_identity(identity_key: &str, seq: &[Value]) -> BTreeMap<String, usize> {
    let mut index = BTreeMap::new();
    for (i, element) in seq.iter().enumerate() {
        index
            .entry(identity_of(element, identity_key).to_string())
            .or_insert(i);
    }
    index
}

fn warn_collision(field: &str, identity: &str) {
    let err: ExError = SurfacelogError::IdentityCollision {
        field: field.to_string(),
        identity: identity.to_string(),
    }
    .into();
    tracing::warn!(
        component = module_path!(),
        op = "diff_object_or_array",
        event = "identity_collision",
        err.code = err.code(),
        field = field,
        identity = identity,
        "{}; first one wins",
        err.message()
    );
}

fn changed_node(older: Option<&Value>, newer: Option<&Value>) -> Value {
    let mut node = Map::new();
    if let Some(old) = older {
        node.insert(markers::OLD.to_string(), old.clone());
    }
    if let Some(new) = newer {
        node.insert(markers::NEW.to_string(), new.clone());
    }
    node.insert(markers::CHANGED.to_string(), Value::Bool(true));
    Value::Object(node)
}

fn as_list(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(|v| v.as_slice())
        .unwrap_or_default()
}

/// Expand every `SimpleOrderedArray` snapshot reachable through `layout`.
///
/// Each `{$old, $new, $key}` node gains a `$diff` list computed with
/// [`diff_array`]; the snapshot itself is left in place. Returns a new tree.
pub fn expand_ordered_arrays(layout: &SchemaLayout, fields: &Map<String, Value>) -> Map<String, Value> {
    let Some(submembers) = layout.submembers() else {
        return fields.clone();
    };
    let mut out = fields.clone();
    for (field, sub) in submembers {
        let Some(node) = fields.get(field) else {
            continue;
        };
        let expanded = match (sub, node) {
            (SchemaLayout::SimpleOrderedArray { .. }, Value::Object(obj)) => {
                Value::Object(expand_snapshot(obj))
            }
            (SchemaLayout::Object { .. }, Value::Object(obj)) => {
                Value::Object(expand_ordered_arrays(sub, obj))
            }
            (
                SchemaLayout::Array { .. } | SchemaLayout::ArrayWithSnapshot { .. },
                Value::Array(items),
            ) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(obj) => Value::Object(expand_ordered_arrays(sub, obj)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            _ => continue,
        };
        out.insert(field.clone(), expanded);
    }
    out
}

fn expand_snapshot(node: &Map<String, Value>) -> Map<String, Value> {
    let mut out = node.clone();
    if let Some(key) = node.get(markers::KEY).and_then(Value::as_str) {
        let old = node.get(markers::OLD).and_then(Value::as_array).map(|v| v.as_slice());
        let new = node.get(markers::NEW).and_then(Value::as_array).map(|v| v.as_slice());
        out.insert(markers::DIFF.to_string(), Value::Array(diff_array(old, new, key)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_ignored_at_every_depth() {
        let ignored: BTreeSet<String> = ["docs".to_string()].into_iter().collect();
        let value = json!({"docs": 1, "a": {"docs": 2, "b": [{"docs": 3, "c": 4}]}});
        assert_eq!(
            strip_ignored(&value, &ignored),
            json!({"a": {"b": [{"c": 4}]}})
        );
    }

    #[test]
    fn test_diff_value_absent_side_left_out() {
        let node = diff_value(&BTreeSet::new(), None, Some(&json!(3))).unwrap();
        assert_eq!(node, json!({"$new": 3, "$changed": true}));
    }

    #[test]
    fn test_diff_value_numeric_representation_counts_as_change() {
        assert!(diff_value(&BTreeSet::new(), Some(&json!(1)), Some(&json!(1.0))).is_some());
    }

    #[test]
    fn test_removals_pass_skips_value_changes() {
        let layout = SchemaLayout::object(
            "name",
            crate::layout::members([("summary", SchemaLayout::value())]),
        );
        let older = json!({"summary": "a"});
        let newer = json!({"summary": "b"});
        let out = diff_engine(
            &layout,
            older.as_object().unwrap(),
            newer.as_object().unwrap(),
            Pass::Removals,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_expand_snapshot_adds_diff() {
        let node = json!({"$old": ["a", "b"], "$new": ["b"], "$changed": true, "$key": "name"});
        let expanded = expand_snapshot(node.as_object().unwrap());
        assert_eq!(
            expanded.get("$diff"),
            Some(&json!([{"$value": "a", "$removed": true}, "b"]))
        );
        assert_eq!(expanded.get("$old"), node.get("$old"));
    }
}
