use serde_json::{json, Value};
use surfacelog_core::layout::{members, SchemaLayout};
use surfacelog_core::{LayoutRegistry, ReleaseBatch, Series, VersionedRecord};

/// Wrap a `json!` object as a record
#[allow(dead_code)]
pub fn record(value: Value) -> VersionedRecord {
    VersionedRecord::from_value(value).unwrap()
}

#[allow(dead_code)]
pub fn batch(version: &str, records: Vec<Value>) -> ReleaseBatch {
    ReleaseBatch::new(version, records.into_iter().map(record).collect())
}

#[allow(dead_code)]
pub fn series(identity: &str, records: Vec<Value>) -> Series {
    Series::new(identity, records.into_iter().map(record).collect())
}

/// `[{name: A}, {name: B}, ...]`
#[allow(dead_code)]
pub fn named(names: &[&str]) -> Vec<Value> {
    names.iter().map(|n| json!({ "name": n })).collect()
}

/// Record layout for a `Class` API entity
///
/// - `description`: plain value
/// - `security`: value whose `docs` subfield is ignored
/// - `tags`: simple ordered array
/// - `properties`: keyed collection with a whole-list snapshot
/// - `functions`: keyed collection of objects with nested `parameters`
/// - `signature`: nested object with its own value, ordered and keyed fields
#[allow(dead_code)]
pub fn class_layout() -> SchemaLayout {
    SchemaLayout::object(
        "uuid",
        members([
            ("description", SchemaLayout::value()),
            ("security", SchemaLayout::value_ignoring(["docs"])),
            ("tags", SchemaLayout::simple_ordered_array("name")),
            ("properties", SchemaLayout::array_with_snapshot("name", None)),
            (
                "functions",
                SchemaLayout::array_of(
                    "name",
                    members([
                        ("summary", SchemaLayout::value()),
                        ("parameters", SchemaLayout::array("name")),
                    ]),
                ),
            ),
            (
                "signature",
                SchemaLayout::object(
                    "name",
                    members([
                        ("returns", SchemaLayout::value()),
                        ("generics", SchemaLayout::simple_ordered_array("name")),
                        ("parameters", SchemaLayout::array("name")),
                    ]),
                ),
            ),
        ]),
    )
}

#[allow(dead_code)]
pub fn registry() -> LayoutRegistry {
    LayoutRegistry::new().with_layout("Class", class_layout())
}
