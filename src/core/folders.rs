//! Folder hierarchy derived from slash-delimited entity names.
//!
//! Version 1 manifests encode hierarchy implicitly in names like
//! `"enemies/slime/body"`. Version 2 makes it explicit: a flat `folders`
//! list of `{id, name, parent}` nodes that parts and comps point into.
//! This module builds that tree incrementally while entities are scanned,
//! deduplicating shared prefixes, and flattens it once both scans finish.

use crate::core::error::MigrateError;
use crate::core::ids::IdAllocator;
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A folder as it appears in the version 2 manifest.
///
/// `parent` is omitted for top-level folders; the root of the tree is a
/// sentinel that never appears in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<u64>,
}

#[derive(Debug)]
struct FolderNode {
    id: u64,
    name: String,
    parent: Option<u64>,
    // Keyed by exact segment string; insertion order kept so flattening
    // is deterministic for a given input.
    children: IndexMap<String, FolderNode>,
}

/// Shared folder tree for one migration run.
///
/// Both the part scan and the comp scan grow the same tree, so entities of
/// either kind that share a path prefix share the same folder node.
#[derive(Debug, Default)]
pub struct FolderTree {
    children: IndexMap<String, FolderNode>,
}

impl FolderTree {
    pub fn new() -> Self {
        FolderTree {
            children: IndexMap::new(),
        }
    }

    /// Walks `segments` (the directory portion of a name, leaf excluded),
    /// creating any missing folder nodes, and returns the id of the deepest
    /// node reached.
    ///
    /// Idempotent: re-walking the same segment sequence returns the same id.
    /// Segment comparison is exact and case-sensitive. An empty sequence or
    /// an empty segment (from names like `"a//b"`) is a malformed-input
    /// error.
    pub fn ensure_path(
        &mut self,
        segments: &[&str],
        ids: &mut IdAllocator,
    ) -> Result<u64, MigrateError> {
        if segments.is_empty() {
            return Err(MigrateError::MalformedName(
                "folder path has no segments".to_string(),
            ));
        }

        let mut children = &mut self.children;
        let mut parent: Option<u64> = None;
        for &segment in segments {
            if segment.is_empty() {
                return Err(MigrateError::MalformedName(format!(
                    "empty segment in folder path '{}'",
                    segments.join("/")
                )));
            }
            let node = match children.entry(segment.to_string()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(FolderNode {
                    id: ids.next_id(),
                    name: segment.to_string(),
                    parent,
                    children: IndexMap::new(),
                }),
            };
            parent = Some(node.id);
            children = &mut node.children;
        }

        parent.ok_or_else(|| {
            MigrateError::MalformedName("folder path has no segments".to_string())
        })
    }

    /// Flattens the tree into the version 2 `folders` list, consuming it.
    ///
    /// Post-order depth-first: children precede their parent, every non-root
    /// node appears exactly once, and the order is stable for a given input.
    pub fn flatten(self) -> Vec<Folder> {
        fn collect(node: FolderNode, out: &mut Vec<Folder>) {
            let FolderNode {
                id,
                name,
                parent,
                children,
            } = node;
            for (_, child) in children {
                collect(child, out);
            }
            out.push(Folder { id, name, parent });
        }

        let mut out = Vec::new();
        for (_, child) in self.children {
            collect(child, &mut out);
        }
        out
    }
}
