//! Archive container handling: tar extraction and zip repackaging.
//!
//! The migration itself never touches archive internals beyond this module.
//! Extraction is traversal-safe: every entry path is normalized and checked
//! against the staging root before a single byte is written, so a malicious
//! archive cannot plant files outside the staging directory.

use crate::core::error::MigrateError;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Manifest entry name at the archive root.
pub const MANIFEST_NAME: &str = "data.json";

/// Editor preferences entry, dropped from version 2 packages.
pub const PREFS_NAME: &str = "prefs.json";

/// Extracts a tape archive into `staging`.
///
/// Directory entries create directories, regular files are written, and all
/// other entry kinds (symlinks, devices) are skipped. Any entry whose path is
/// absolute or contains a `..` component aborts extraction with a
/// path-traversal error.
pub fn extract_tar(archive_path: &Path, staging: &Path) -> Result<(), MigrateError> {
    let file = File::open(archive_path)?;
    let mut archive = tar::Archive::new(file);
    for entry in archive.entries()? {
        let mut entry = entry?;
        let raw = entry.path()?.into_owned();
        let dest = checked_entry_dest(&raw, staging)?;
        let kind = entry.header().entry_type();
        if kind.is_dir() {
            fs::create_dir_all(&dest)?;
        } else if kind.is_file() {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&dest)?;
            io::copy(&mut entry, &mut out)?;
        }
    }
    Ok(())
}

/// Resolves an entry path against the staging root, rejecting anything that
/// would land outside it. Normalization first (no absolute paths, no `..`,
/// no drive prefixes), then a prefix check of the joined destination.
fn checked_entry_dest(raw: &Path, staging: &Path) -> Result<PathBuf, MigrateError> {
    for component in raw.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(MigrateError::PathTraversal(raw.display().to_string()));
            }
        }
    }
    let dest = staging.join(raw);
    if !dest.starts_with(staging) {
        return Err(MigrateError::PathTraversal(raw.display().to_string()));
    }
    Ok(dest)
}

/// Deletes entries excluded from version 2 packages (currently just
/// `prefs.json` at the staging root). Absence is not an error.
pub fn remove_excluded_entries(staging: &Path) -> Result<(), MigrateError> {
    let prefs = staging.join(PREFS_NAME);
    if prefs.exists() {
        fs::remove_file(prefs)?;
    }
    Ok(())
}

/// Packs the full staging tree into a deflate-compressed zip at `output`.
///
/// Entries are sorted by relative path so repackaging the same tree produces
/// the same entry order. A failed pack removes the partial output file; a
/// failed run must leave no archive behind.
pub fn pack_zip(staging: &Path, output: &Path) -> Result<(), MigrateError> {
    let result = write_zip(staging, output);
    if result.is_err() {
        let _ = fs::remove_file(output);
    }
    result
}

fn write_zip(staging: &Path, output: &Path) -> Result<(), MigrateError> {
    let mut files = Vec::new();
    collect_files(staging, staging, &mut files)?;
    files.sort();

    let mut writer = ZipWriter::new(File::create(output)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for rel in files {
        let mut file = File::open(staging.join(&rel))?;
        let name = rel.to_string_lossy().replace('\\', "/");
        writer.start_file(name, options)?;
        io::copy(&mut file, &mut writer)?;
    }
    writer.finish()?;
    Ok(())
}

fn collect_files(dir: &Path, root: &Path, acc: &mut Vec<PathBuf>) -> Result<(), MigrateError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, root, acc)?;
        } else {
            let rel = path
                .strip_prefix(root)
                .map_err(|e| MigrateError::IoError(io::Error::other(e)))?;
            acc.push(rel.to_path_buf());
        }
    }
    Ok(())
}
