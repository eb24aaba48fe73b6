//! Order-preserving reconciliation of keyed sequences.
//!
//! Elements are matched across two versions of a collection by their identity
//! key. The longest common subsequence of keys decides which elements are
//! retained; everything else surfaces as `$removed` (old side) or `$added`
//! (new side). A reordered element therefore shows up as one addition plus
//! one removal, never as a move.

use crate::model::markers;
use serde_json::{Map, Value};

/// Identity of one collection element.
///
/// Objects are identified by their `identity_key` field (`null` when the
/// field is missing); any other element is its own identity.
pub fn identity_of(element: &Value, identity_key: &str) -> Value {
    match element {
        Value::Object(obj) => obj.get(identity_key).cloned().unwrap_or(Value::Null),
        other => other.clone(),
    }
}

/// Longest common subsequence of the identity keys of `old` and `new`.
///
/// The result is ordered consistently with both inputs.
pub fn longest_common_subsequence(old: &[Value], new: &[Value], identity_key: &str) -> Vec<Value> {
    let old_keys = keys(old, identity_key);
    let new_keys = keys(new, identity_key);
    matched_pairs(&old_keys, &new_keys)
        .into_iter()
        .map(|(i, _)| old_keys[i].clone())
        .collect()
}

/// Reconcile `old` into `new`.
///
/// For every retained element, the unreached `old` elements before it are
/// emitted flagged `$removed`, then the unreached `new` elements flagged
/// `$added`, then the retained element itself (taken from `new`, unflagged).
/// Trailing removals and additions are flushed last. A missing side counts
/// as empty.
pub fn diff_array(old: Option<&[Value]>, new: Option<&[Value]>, identity_key: &str) -> Vec<Value> {
    let old = old.unwrap_or_default();
    let new = new.unwrap_or_default();
    let old_keys = keys(old, identity_key);
    let new_keys = keys(new, identity_key);

    let mut out = Vec::with_capacity(old.len().max(new.len()));
    let (mut oi, mut ni) = (0, 0);
    for (mi, mj) in matched_pairs(&old_keys, &new_keys) {
        out.extend(old[oi..mi].iter().map(|e| flag(e, markers::REMOVED)));
        out.extend(new[ni..mj].iter().map(|e| flag(e, markers::ADDED)));
        out.push(new[mj].clone());
        oi = mi + 1;
        ni = mj + 1;
    }
    out.extend(old[oi..].iter().map(|e| flag(e, markers::REMOVED)));
    out.extend(new[ni..].iter().map(|e| flag(e, markers::ADDED)));
    out
}

/// Copy `element` with `marker: true` set. Non-object elements are wrapped
/// as `{"$value": element, marker: true}`.
pub fn flag(element: &Value, marker: &str) -> Value {
    let mut obj = match element {
        Value::Object(obj) => obj.clone(),
        other => {
            let mut wrapped = Map::new();
            wrapped.insert(markers::VALUE.to_string(), other.clone());
            wrapped
        }
    };
    obj.insert(marker.to_string(), Value::Bool(true));
    Value::Object(obj)
}

fn keys(seq: &[Value], identity_key: &str) -> Vec<Value> {
    seq.iter().map(|e| identity_of(e, identity_key)).collect()
}

/// Index pairs `(old, new)` of the LCS, in ascending order.
///
/// Classic O(n·m) table. Backtracking from the bottom-right cell steps left
/// (drops a `new` element) only when the left cell is strictly longer than
/// the cell above; ties drop the `old` element first.
fn matched_pairs(old: &[Value], new: &[Value]) -> Vec<(usize, usize)> {
    let (n, m) = (old.len(), new.len());
    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in 1..=n {
        for j in 1..=m {
            table[i * width + j] = if old[i - 1] == new[j - 1] {
                table[(i - 1) * width + (j - 1)] + 1
            } else {
                table[(i - 1) * width + j].max(table[i * width + (j - 1)])
            };
        }
    }

    let mut pairs = Vec::with_capacity(table[n * width + m] as usize);
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        if old[i - 1] == new[j - 1] {
            pairs.push((i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else if table[i * width + (j - 1)] > table[(i - 1) * width + j] {
            j -= 1;
        } else {
            i -= 1;
        }
    }
    pairs.reverse();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn named(names: &[&str]) -> Vec<Value> {
        names.iter().map(|n| json!({ "name": n })).collect()
    }

    #[test]
    fn test_tie_drops_old_first() {
        // At the C/B cell both neighbours hold length 2; stepping up keeps B.
        let lcs = longest_common_subsequence(
            &named(&["A", "B", "C", "D"]),
            &named(&["A", "C", "B", "D"]),
            "name",
        );
        assert_eq!(lcs, vec![json!("A"), json!("B"), json!("D")]);
    }

    #[test]
    fn test_missing_identity_key_matches_as_null() {
        let old = vec![json!({"other": 1})];
        let new = vec![json!({"other": 2})];
        let diff = diff_array(Some(old.as_slice()), Some(new.as_slice()), "name");
        assert_eq!(diff, vec![json!({"other": 2})]);
    }

    #[test]
    fn test_scalar_elements_are_wrapped_when_flagged() {
        let old = vec![json!("a"), json!("b")];
        let new = vec![json!("b"), json!("c")];
        let diff = diff_array(Some(old.as_slice()), Some(new.as_slice()), "unused");
        assert_eq!(
            diff,
            vec![
                json!({"$value": "a", "$removed": true}),
                json!("b"),
                json!({"$value": "c", "$added": true}),
            ]
        );
    }

    #[test]
    fn test_retained_element_taken_from_new_side() {
        let old = vec![json!({"name": "A", "doc": "old"})];
        let new = vec![json!({"name": "A", "doc": "new"})];
        let diff = diff_array(Some(old.as_slice()), Some(new.as_slice()), "name");
        assert_eq!(diff, vec![json!({"name": "A", "doc": "new"})]);
    }

    #[test]
    fn test_both_sides_missing() {
        assert!(diff_array(None, None, "name").is_empty());
    }

    fn arb_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop::sample::select(vec!["A", "B", "C", "D", "E"]), 0..8)
            .prop_map(|v| v.into_iter().map(String::from).collect())
    }

    fn to_seq(names: &[String]) -> Vec<Value> {
        names.iter().map(|n| json!({ "name": n })).collect()
    }

    proptest! {
        #[test]
        fn retained_elements_equal_lcs(old in arb_names(), new in arb_names()) {
            let (old, new) = (to_seq(&old), to_seq(&new));
            let diff = diff_array(Some(old.as_slice()), Some(new.as_slice()), "name");
            let retained: Vec<Value> = diff
                .iter()
                .filter(|e| e.get(markers::ADDED).is_none() && e.get(markers::REMOVED).is_none())
                .map(|e| identity_of(e, "name"))
                .collect();
            prop_assert_eq!(retained, longest_common_subsequence(&old, &new, "name"));
        }

        #[test]
        fn diff_accounts_for_every_element(old in arb_names(), new in arb_names()) {
            let (old_seq, new_seq) = (to_seq(&old), to_seq(&new));
            let diff = diff_array(Some(old_seq.as_slice()), Some(new_seq.as_slice()), "name");
            let removed = diff.iter().filter(|e| e.get(markers::REMOVED).is_some()).count();
            let added = diff.iter().filter(|e| e.get(markers::ADDED).is_some()).count();
            let lcs = longest_common_subsequence(&old_seq, &new_seq, "name").len();
            prop_assert_eq!(removed + lcs, old.len());
            prop_assert_eq!(added + lcs, new.len());
        }

        #[test]
        fn diff_with_self_is_identity(seq in arb_names()) {
            let seq = to_seq(&seq);
            prop_assert_eq!(diff_array(Some(seq.as_slice()), Some(seq.as_slice()), "name"), seq.clone());
        }

        #[test]
        fn lcs_preserves_order_of_new(old in arb_names(), new in arb_names()) {
            let lcs = longest_common_subsequence(&to_seq(&old), &to_seq(&new), "name");
            let mut it = new.iter();
            for key in &lcs {
                let key = key.as_str().unwrap_or_default();
                prop_assert!(it.any(|n| n == key));
            }
        }
    }
}
