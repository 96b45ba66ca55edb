//! Manifest-level migration properties: id allocation, folder derivation,
//! mode extraction, and comp→part reference resolution.

use serde_json::{json, Value};
use spritemig::core::error::MigrateError;
use spritemig::core::migrate::migrate_manifest;

fn migrate(manifest: Value) -> Value {
    migrate_manifest(manifest).unwrap()
}

fn collect_ids(manifest: &Value) -> Vec<u64> {
    let mut ids = Vec::new();
    for key in ["folders", "parts", "comps"] {
        for entity in manifest[key].as_array().unwrap() {
            ids.push(entity["id"].as_u64().unwrap());
            if let Some(slots) = entity.get("parts").and_then(Value::as_array) {
                for slot in slots {
                    ids.push(slot["id"].as_u64().unwrap());
                }
            }
        }
    }
    ids
}

// ---------------------------------------------------------------------------
// Identifier allocation
// ---------------------------------------------------------------------------

#[test]
fn test_ids_are_unique_across_entity_kinds() {
    let out = migrate(json!({
        "version": 1,
        "parts": {
            "a/x": {"idle": {}},
            "a/y": {"idle": {}},
            "z": {"idle": {}}
        },
        "comps": {
            "a/c": {"parts": [{"part": "a/x"}, {"part": ""}]},
            "d": {"parts": []}
        }
    }));

    let mut ids = collect_ids(&out);
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn test_ids_are_allocated_in_scan_order() {
    // Folder ids precede the owning entity's id; entities follow manifest
    // key order.
    let out = migrate(json!({
        "version": 1,
        "parts": {"a/x": {}, "b/y": {}},
        "comps": {}
    }));

    let parts = out["parts"].as_array().unwrap();
    let folders = out["folders"].as_array().unwrap();
    let folder_a = folders.iter().find(|f| f["name"] == "a").unwrap();
    let folder_b = folders.iter().find(|f| f["name"] == "b").unwrap();
    assert_eq!(folder_a["id"], json!(1));
    assert_eq!(parts[0]["id"], json!(2));
    assert_eq!(folder_b["id"], json!(3));
    assert_eq!(parts[1]["id"], json!(4));
}

// ---------------------------------------------------------------------------
// Folder derivation
// ---------------------------------------------------------------------------

#[test]
fn test_shared_path_prefix_yields_one_folder() {
    let out = migrate(json!({
        "version": 1,
        "parts": {"a/b/x": {}, "a/b/y": {}},
        "comps": {}
    }));

    let folders = out["folders"].as_array().unwrap();
    assert_eq!(folders.iter().filter(|f| f["name"] == "a").count(), 1);
    assert_eq!(folders.iter().filter(|f| f["name"] == "b").count(), 1);

    let a = folders.iter().find(|f| f["name"] == "a").unwrap();
    let b = folders.iter().find(|f| f["name"] == "b").unwrap();
    assert!(a.get("parent").is_none());
    assert_eq!(b["parent"], a["id"]);

    let parts = out["parts"].as_array().unwrap();
    assert_eq!(parts[0]["parent"], b["id"]);
    assert_eq!(parts[1]["parent"], b["id"]);
}

#[test]
fn test_leaf_and_parent_split() {
    let out = migrate(json!({
        "version": 1,
        "parts": {"x": {}, "a/x": {}},
        "comps": {}
    }));

    let parts = out["parts"].as_array().unwrap();
    let bare = &parts[0];
    assert_eq!(bare["name"], "x");
    assert!(bare.get("parent").is_none());

    let folders = out["folders"].as_array().unwrap();
    let a = folders.iter().find(|f| f["name"] == "a").unwrap();
    let nested = &parts[1];
    assert_eq!(nested["name"], "x");
    assert_eq!(nested["parent"], a["id"]);
}

#[test]
fn test_parts_and_comps_share_the_folder_tree() {
    let out = migrate(json!({
        "version": 1,
        "parts": {"ui/x": {}},
        "comps": {"ui/c": {"parts": []}}
    }));

    let folders = out["folders"].as_array().unwrap();
    assert_eq!(folders.len(), 1);
    let ui = &folders[0];
    assert_eq!(out["parts"][0]["parent"], ui["id"]);
    assert_eq!(out["comps"][0]["parent"], ui["id"]);
}

// ---------------------------------------------------------------------------
// Mode extraction
// ---------------------------------------------------------------------------

#[test]
fn test_mode_objects_move_into_named_modes_list() {
    let out = migrate(json!({
        "version": 1,
        "parts": {
            "hero": {
                "idle": {"numFrames": 2, "frames": [{"image": "a.png"}]},
                "walk": {"numFrames": 4},
                "properties": "{\"solid\": true}"
            }
        },
        "comps": {}
    }));

    let part = &out["parts"][0];
    let modes = part["modes"].as_array().unwrap();
    assert_eq!(modes.len(), 2);
    assert_eq!(modes[0]["name"], "idle");
    assert_eq!(modes[0]["numFrames"], 2);
    assert_eq!(modes[0]["frames"][0]["image"], "a.png");
    assert_eq!(modes[1]["name"], "walk");

    // Scalar fields stay on the part; mode keys are gone.
    assert_eq!(part["properties"], "{\"solid\": true}");
    assert!(part.get("idle").is_none());
    assert!(part.get("walk").is_none());
}

// ---------------------------------------------------------------------------
// Reference resolution
// ---------------------------------------------------------------------------

#[test]
fn test_part_reference_resolves_to_assigned_id() {
    let out = migrate(json!({
        "version": 1,
        "parts": {"a/x": {}},
        "comps": {"c": {"parts": [{"part": "a/x"}]}}
    }));

    let part_id = out["parts"][0]["id"].clone();
    assert_eq!(out["comps"][0]["parts"][0]["part"], part_id);
}

#[test]
fn test_empty_reference_is_elided() {
    let out = migrate(json!({
        "version": 1,
        "parts": {},
        "comps": {"c": {"parts": [{"part": "", "name": "slot0"}]}}
    }));

    let slot = &out["comps"][0]["parts"][0];
    assert!(slot.get("part").is_none());
    assert_eq!(slot["name"], "slot0");
    assert!(slot["id"].is_u64());
}

#[test]
fn test_dangling_reference_is_fatal() {
    let err = migrate_manifest(json!({
        "version": 1,
        "parts": {"a/x": {}},
        "comps": {"c": {"parts": [{"part": "a/ghost"}]}}
    }))
    .unwrap_err();

    match err {
        MigrateError::DanglingPartRef { comp, part } => {
            assert_eq!(comp, "c");
            assert_eq!(part, "a/ghost");
        }
        other => panic!("expected DanglingPartRef, got {other:?}"),
    }
}

#[test]
fn test_comp_slot_ids_follow_the_comp_id() {
    let out = migrate(json!({
        "version": 1,
        "parts": {"x": {}},
        "comps": {"c": {"parts": [{"part": "x"}, {"part": ""}]}}
    }));

    let comp = &out["comps"][0];
    let comp_id = comp["id"].as_u64().unwrap();
    let slots = comp["parts"].as_array().unwrap();
    assert_eq!(slots[0]["id"].as_u64().unwrap(), comp_id + 1);
    assert_eq!(slots[1]["id"].as_u64().unwrap(), comp_id + 2);
}

// ---------------------------------------------------------------------------
// Gates and malformed input
// ---------------------------------------------------------------------------

#[test]
fn test_version_gate_rejects_already_migrated_manifest() {
    let err = migrate_manifest(json!({"version": 2, "parts": {}, "comps": {}})).unwrap_err();
    assert!(matches!(err, MigrateError::VersionMismatch { .. }));
}

#[test]
fn test_version_gate_rejects_missing_version() {
    let err = migrate_manifest(json!({"parts": {}, "comps": {}})).unwrap_err();
    assert!(matches!(err, MigrateError::VersionMismatch { .. }));
}

#[test]
fn test_missing_parts_key_is_malformed() {
    let err = migrate_manifest(json!({"version": 1, "comps": {}})).unwrap_err();
    assert!(matches!(err, MigrateError::MalformedManifest(_)));
}

#[test]
fn test_missing_comps_key_is_malformed() {
    let err = migrate_manifest(json!({"version": 1, "parts": {}})).unwrap_err();
    assert!(matches!(err, MigrateError::MalformedManifest(_)));
}

#[test]
fn test_non_object_part_is_malformed() {
    let err = migrate_manifest(json!({
        "version": 1,
        "parts": {"x": 5},
        "comps": {}
    }))
    .unwrap_err();
    assert!(matches!(err, MigrateError::MalformedManifest(_)));
}

#[test]
fn test_empty_name_segment_is_malformed() {
    let err = migrate_manifest(json!({
        "version": 1,
        "parts": {"a//b": {}},
        "comps": {}
    }))
    .unwrap_err();
    assert!(matches!(err, MigrateError::MalformedName(_)));
}

#[test]
fn test_trailing_separator_is_malformed() {
    let err = migrate_manifest(json!({
        "version": 1,
        "parts": {"a/": {}},
        "comps": {}
    }))
    .unwrap_err();
    assert!(matches!(err, MigrateError::MalformedName(_)));
}

#[test]
fn test_non_string_part_reference_is_malformed() {
    let err = migrate_manifest(json!({
        "version": 1,
        "parts": {},
        "comps": {"c": {"parts": [{"part": 3}]}}
    }))
    .unwrap_err();
    assert!(matches!(err, MigrateError::MalformedManifest(_)));
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn test_end_to_end_manifest_rewrite() {
    let out = migrate(json!({
        "version": 1,
        "parts": {"icons/a": {"idle": {}}},
        "comps": {"root": {"parts": [{"part": "icons/a"}]}}
    }));

    assert_eq!(
        out,
        json!({
            "version": 2,
            "parts": [{"id": 2, "name": "a", "parent": 1, "modes": [{"name": "idle"}]}],
            "comps": [{"id": 3, "name": "root", "parts": [{"id": 4, "part": 2}]}],
            "folders": [{"id": 1, "name": "icons"}]
        })
    );
}

#[test]
fn test_unrelated_root_keys_pass_through() {
    let out = migrate(json!({
        "version": 1,
        "parts": {},
        "comps": {},
        "canvasSize": [320, 240]
    }));
    assert_eq!(out["canvasSize"], json!([320, 240]));
}

#[test]
fn test_migration_is_deterministic() {
    let input = json!({
        "version": 1,
        "parts": {"a/x": {"idle": {}}, "a/y": {}, "b/z": {}},
        "comps": {"c": {"parts": [{"part": "a/y"}]}}
    });
    assert_eq!(migrate(input.clone()), migrate(input));
}
