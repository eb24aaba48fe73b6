mod common;

use common::{class_layout, record, series};
use serde_json::json;
use surfacelog_core::changelog::{attach_changelog, ChangelogAssembler};
use surfacelog_core::{Series, SurfacelogError};

#[test]
fn test_identical_versions_yield_only_genesis() {
    let layout = class_layout();
    let s = series(
        "c1",
        vec![
            json!({"uuid": "c1", "version": "1.0.0", "description": "d", "tags": [{"name": "a"}]}),
            json!({"uuid": "c1", "version": "2.0.0", "description": "d", "tags": [{"name": "a"}]}),
        ],
    );
    let changelog = ChangelogAssembler::new(&layout, "version").assemble(&s).unwrap();

    assert_eq!(changelog.len(), 1);
    let genesis = &changelog.entries()[0];
    assert_eq!(genesis.version, "1.0.0");
    assert!(genesis.added);
    assert!(!changelog.to_value("version").to_string().contains("$changed"));
}

#[test]
fn test_additions_and_removals_attributed_to_their_versions() {
    let layout = class_layout();
    let s = series(
        "c1",
        vec![
            json!({"uuid": "c1", "version": "1.0.0",
                   "functions": [{"name": "fire", "summary": "s"}, {"name": "stop"}]}),
            json!({"uuid": "c1", "version": "2.0.0",
                   "functions": [{"name": "fire", "summary": "s"}, {"name": "start"}]}),
        ],
    );
    let changelog = ChangelogAssembler::new(&layout, "version").assemble(&s).unwrap();

    assert_eq!(
        changelog.to_value("version"),
        json!([
            {
                "version": "2.0.0",
                "functions": [{"name": "start", "$added": true}]
            },
            {
                "version": "1.0.0",
                "$added": true,
                "uuid": "c1",
                "functions": [
                    {"name": "fire", "summary": "s"},
                    {"name": "stop", "$removed": true}
                ]
            }
        ])
    );
}

#[test]
fn test_entries_newest_first_across_three_versions() {
    let layout = class_layout();
    let s = series(
        "c1",
        vec![
            json!({"version": "1.10.0", "description": "b", "functions": [{"name": "go"}]}),
            json!({"version": "1.0.0", "description": "a"}),
            json!({"version": "1.2.0", "description": "b"}),
        ],
    );
    let changelog = ChangelogAssembler::new(&layout, "version").assemble(&s).unwrap();

    let versions: Vec<&str> = changelog.entries().iter().map(|e| e.version.as_str()).collect();
    assert_eq!(versions, vec!["1.10.0", "1.2.0", "1.0.0"]);
    assert_eq!(
        changelog.entry("1.2.0").unwrap().fields["description"],
        json!({"$old": "a", "$new": "b", "$changed": true})
    );
    assert_eq!(
        changelog.entry("1.10.0").unwrap().fields["functions"],
        json!([{"name": "go", "$added": true}])
    );
}

#[test]
fn test_ordered_array_expansion_can_be_turned_off() {
    let layout = class_layout();
    let s = series(
        "c1",
        vec![
            json!({"version": "1.0.0", "tags": [{"name": "a"}]}),
            json!({"version": "2.0.0", "tags": [{"name": "b"}]}),
        ],
    );

    let expanded = ChangelogAssembler::new(&layout, "version").assemble(&s).unwrap();
    assert!(expanded.entry("2.0.0").unwrap().fields["tags"].get("$diff").is_some());

    let raw = ChangelogAssembler::new(&layout, "version")
        .with_expand_ordered_arrays(false)
        .assemble(&s)
        .unwrap();
    assert!(raw.entry("2.0.0").unwrap().fields["tags"].get("$diff").is_none());
}

#[test]
fn test_nested_object_changes_attributed_and_merged() {
    let layout = class_layout();
    let s = series(
        "c1",
        vec![
            json!({"version": "1.0.0", "signature": {
                "name": "fire", "returns": "void",
                "parameters": [{"name": "x"}, {"name": "y"}]
            }}),
            json!({"version": "2.0.0", "signature": {
                "name": "fire", "returns": "bool",
                "parameters": [{"name": "x"}]
            }}),
        ],
    );
    let changelog = ChangelogAssembler::new(&layout, "version").assemble(&s).unwrap();

    assert_eq!(
        changelog.entry("2.0.0").unwrap().fields["signature"],
        json!({"name": "fire", "returns": {"$old": "void", "$new": "bool", "$changed": true}})
    );
    // The removal found leaving 1.0.0 is merged into the genesis copy in place.
    assert_eq!(
        changelog.entry("1.0.0").unwrap().fields["signature"],
        json!({
            "name": "fire",
            "returns": "void",
            "parameters": [{"name": "x"}, {"name": "y", "$removed": true}]
        })
    );
}

#[test]
fn test_retired_series_gets_removal_entry() {
    let layout = class_layout();
    let s = Series::new(
        "c1",
        vec![record(json!({"releaseVersion": "1.0.0", "description": "d"}))],
    )
    .with_retired_in("2.0.0");
    let changelog = ChangelogAssembler::new(&layout, "releaseVersion")
        .assemble(&s)
        .unwrap();

    assert_eq!(changelog.len(), 2);
    assert_eq!(
        changelog.to_value("releaseVersion")[0],
        json!({"releaseVersion": "2.0.0", "$removed": true})
    );
}

#[test]
fn test_missing_version_skips_series() {
    let layout = class_layout();
    let s = series(
        "c1",
        vec![json!({"version": "1.0.0"}), json!({"description": "no version"})],
    );
    let err = ChangelogAssembler::new(&layout, "version")
        .assemble(&s)
        .unwrap_err();
    assert_eq!(
        err,
        SurfacelogError::MissingVersionKey {
            series_id: "c1".to_string(),
            version_key: "version".to_string(),
        }
    );
}

#[test]
fn test_attach_changelog_leaves_input_untouched() {
    let layout = class_layout();
    let s = series(
        "c1",
        vec![
            json!({"version": "1.0.0", "description": "a"}),
            json!({"version": "2.0.0", "description": "b"}),
        ],
    );
    let changelog = ChangelogAssembler::new(&layout, "version").assemble(&s).unwrap();
    let newest = &s.records()[1];
    let annotated = attach_changelog(newest, &changelog, "changelog", "version");

    assert!(newest.get("changelog").is_none());
    assert_eq!(annotated.get("changelog"), Some(&changelog.to_value("version")));
    assert_eq!(annotated.str_field("description"), Some("b"));
}
