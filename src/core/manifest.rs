//! Version 2 manifest data model.
//!
//! Version 1 stores parts and comps as JSON objects keyed by slash path;
//! version 2 stores them as lists of id-addressed entities. The structs here
//! are the output shapes. Fields this migration does not touch (frame data,
//! properties, comp layout fields) pass through verbatim via
//! `#[serde(flatten)]` maps — the input is parsed permissively and nothing
//! beyond the restructured keys is interpreted.

use crate::core::error::MigrateError;
use serde::Serialize;
use serde_json::{Map, Value};

pub use crate::core::folders::Folder;

/// A named animation/state bundle within a part. Frame data inside `data`
/// is carried through untouched.
#[derive(Debug, Serialize)]
pub struct Mode {
    pub name: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// A sprite part in version 2 form.
#[derive(Debug, Serialize)]
pub struct Part {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    pub modes: Vec<Mode>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One slot in a comp's `parts` list. `part` holds the resolved part id, or
/// is omitted entirely when the version 1 reference was empty.
#[derive(Debug, Serialize)]
pub struct CompPart {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part: Option<u64>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A composition in version 2 form.
#[derive(Debug, Serialize)]
pub struct Comp {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
    pub parts: Vec<CompPart>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Splits a version 1 entity name into (directory segments, leaf name).
///
/// Empty names, empty leaves (trailing `/`), and empty segments (`"a//b"`,
/// leading `/`) are malformed input.
pub fn split_name(name: &str) -> Result<(Vec<&str>, &str), MigrateError> {
    if name.is_empty() {
        return Err(MigrateError::MalformedName(
            "entity name is empty".to_string(),
        ));
    }
    let segments: Vec<&str> = name.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(MigrateError::MalformedName(format!(
            "entity name '{}' contains an empty segment",
            name
        )));
    }
    let (leaf, dirs) = segments
        .split_last()
        .ok_or_else(|| MigrateError::MalformedName("entity name is empty".to_string()))?;
    Ok((dirs.to_vec(), *leaf))
}

/// Splits a version 1 part body into scalar fields and named modes.
///
/// One explicit classification pass: the `properties` key is always a scalar
/// field (it may legally hold an object), any other object-valued key is a
/// mode, everything else is a scalar field. Entry order is preserved.
pub fn classify_part_fields(
    body: Map<String, Value>,
) -> (Map<String, Value>, Vec<(String, Map<String, Value>)>) {
    let mut scalars = Map::new();
    let mut modes = Vec::new();
    for (key, value) in body {
        match value {
            Value::Object(mode) if key != "properties" => modes.push((key, mode)),
            other => {
                scalars.insert(key, other);
            }
        }
    }
    (scalars, modes)
}
