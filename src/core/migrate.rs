//! Version 1 → version 2 manifest migration.
//!
//! Sequencing matters: all parts are rewritten first so the name→id index is
//! complete before any comp reference is resolved, and the shared folder tree
//! is flattened only after both scans have grown it.

use crate::core::error::MigrateError;
use crate::core::folders::FolderTree;
use crate::core::ids::IdAllocator;
use crate::core::manifest::{classify_part_fields, split_name, Comp, CompPart, Mode, Part};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Rewrites a decoded version 1 manifest into version 2 form.
///
/// Root keys other than `version`, `parts`, and `comps` pass through
/// verbatim in their original positions; `folders` is appended. The returned
/// manifest is a fresh value; on error nothing observable has been mutated.
pub fn migrate_manifest(manifest: Value) -> Result<Value, MigrateError> {
    let Value::Object(root) = manifest else {
        return Err(MigrateError::MalformedManifest(
            "manifest root is not an object".to_string(),
        ));
    };

    match root.get("version").and_then(Value::as_i64) {
        Some(1) => {}
        _ => {
            let found = root
                .get("version")
                .map(Value::to_string)
                .unwrap_or_else(|| "missing".to_string());
            return Err(MigrateError::VersionMismatch { found });
        }
    }

    let mut ids = IdAllocator::new();
    let mut tree = FolderTree::new();
    let mut part_index: HashMap<String, u64> = HashMap::new();

    let mut out = Map::new();
    let mut parts_in = None;
    let mut comps_in = None;
    for (key, value) in root {
        match key.as_str() {
            "version" => {
                out.insert(key, json!(2));
            }
            // Placeholders keep the original key positions; the rewritten
            // lists are swapped in below.
            "parts" => {
                parts_in = Some(value);
                out.insert(key, Value::Null);
            }
            "comps" => {
                comps_in = Some(value);
                out.insert(key, Value::Null);
            }
            _ => {
                out.insert(key, value);
            }
        }
    }

    let parts_in = take_object_collection(parts_in, "parts")?;
    let comps_in = take_object_collection(comps_in, "comps")?;

    let mut parts = Vec::with_capacity(parts_in.len());
    for (name, body) in parts_in {
        let Value::Object(body) = body else {
            return Err(MigrateError::MalformedManifest(format!(
                "part '{}' is not an object",
                name
            )));
        };
        let (leaf, parent) = rewrite_name(&name, &mut tree, &mut ids)?;
        let id = ids.next_id();
        let (fields, raw_modes) = classify_part_fields(body);
        let modes = raw_modes
            .into_iter()
            .map(|(mode_name, mut data)| {
                // The mode's key becomes its `name`; a stray `name` field in
                // the mode body would collide with it on output.
                data.remove("name");
                Mode {
                    name: mode_name,
                    data,
                }
            })
            .collect();
        part_index.insert(name, id);
        parts.push(Part {
            id,
            name: leaf,
            parent,
            modes,
            fields,
        });
    }

    let mut comps = Vec::with_capacity(comps_in.len());
    for (name, body) in comps_in {
        let Value::Object(mut body) = body else {
            return Err(MigrateError::MalformedManifest(format!(
                "comp '{}' is not an object",
                name
            )));
        };
        let (leaf, parent) = rewrite_name(&name, &mut tree, &mut ids)?;
        let id = ids.next_id();
        let slots = match body.remove("parts") {
            Some(Value::Array(slots)) => slots,
            Some(_) => {
                return Err(MigrateError::MalformedManifest(format!(
                    "comp '{}' has a non-list 'parts' field",
                    name
                )));
            }
            None => Vec::new(),
        };
        let parts_out = resolve_part_refs(&name, slots, &part_index, &mut ids)?;
        comps.push(Comp {
            id,
            name: leaf,
            parent,
            parts: parts_out,
            fields: body,
        });
    }

    let folders = tree.flatten();

    out.insert("parts".to_string(), serde_json::to_value(parts)?);
    out.insert("comps".to_string(), serde_json::to_value(comps)?);
    out.insert("folders".to_string(), serde_json::to_value(folders)?);

    Ok(Value::Object(out))
}

/// Splits an entity name, ensuring folder nodes for the directory portion.
/// Returns the leaf name and the enclosing folder id (None when the name had
/// no separator).
fn rewrite_name(
    name: &str,
    tree: &mut FolderTree,
    ids: &mut IdAllocator,
) -> Result<(String, Option<u64>), MigrateError> {
    let (dirs, leaf) = split_name(name)?;
    let parent = if dirs.is_empty() {
        None
    } else {
        Some(tree.ensure_path(&dirs, ids)?)
    };
    Ok((leaf.to_string(), parent))
}

/// Rewrites one comp's `parts` list: each slot gains a fresh id, and its
/// `part` reference goes from a full path name to the referenced part's id.
///
/// An empty or absent reference means "no part"; in version 2 that is
/// expressed by omitting the key. A name missing from the index is a
/// reference-integrity failure naming both ends of the dangling edge.
fn resolve_part_refs(
    comp_name: &str,
    slots: Vec<Value>,
    part_index: &HashMap<String, u64>,
    ids: &mut IdAllocator,
) -> Result<Vec<CompPart>, MigrateError> {
    let mut out = Vec::with_capacity(slots.len());
    for slot in slots {
        let Value::Object(mut fields) = slot else {
            return Err(MigrateError::MalformedManifest(format!(
                "comp '{}' has a non-object entry in 'parts'",
                comp_name
            )));
        };
        let id = ids.next_id();
        let part = match fields.remove("part") {
            None => None,
            Some(Value::String(target)) if target.is_empty() => None,
            Some(Value::String(target)) => {
                let resolved =
                    part_index
                        .get(&target)
                        .ok_or_else(|| MigrateError::DanglingPartRef {
                            comp: comp_name.to_string(),
                            part: target.clone(),
                        })?;
                Some(*resolved)
            }
            Some(_) => {
                return Err(MigrateError::MalformedManifest(format!(
                    "comp '{}' has a non-string part reference",
                    comp_name
                )));
            }
        };
        out.push(CompPart { id, part, fields });
    }
    Ok(out)
}

fn take_object_collection(
    value: Option<Value>,
    key: &str,
) -> Result<Map<String, Value>, MigrateError> {
    match value {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(MigrateError::MalformedManifest(format!(
            "'{}' is not an object",
            key
        ))),
        None => Err(MigrateError::MalformedManifest(format!(
            "manifest has no '{}' key",
            key
        ))),
    }
}
