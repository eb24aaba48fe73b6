//! Structural diff of versioned records.
//!
//! - [`sequence`]: longest-common-subsequence reconciliation of keyed lists
//! - [`engine`]: layout-driven recursive diff of two record versions
//! - [`merge`]: layout-aware merge of partial diff trees
//!
//! ```
//! use surfacelog_core::diff::diff_array;
//! use serde_json::json;
//!
//! let old = vec![json!({"name": "A"}), json!({"name": "B"}), json!({"name": "C"})];
//! let new = vec![json!({"name": "B"}), json!({"name": "C"}), json!({"name": "D"})];
//! let diff = diff_array(Some(old.as_slice()), Some(new.as_slice()), "name");
//! assert_eq!(diff[0], json!({"name": "A", "$removed": true}));
//! assert_eq!(diff[3], json!({"name": "D", "$added": true}));
//! ```

pub mod engine;
pub mod merge;
pub mod sequence;

pub use engine::{diff_engine, diff_value, expand_ordered_arrays, Pass};
pub use merge::merge_members;
pub use sequence::{diff_array, longest_common_subsequence};
