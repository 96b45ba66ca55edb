//! Spritemig: sprite project schema converter (version 1 → version 2).
//!
//! A version 1 sprite project is a tape archive (`.tar`) holding a JSON
//! manifest (`data.json`) plus auxiliary files (images, preference data).
//! Its manifest is flat: parts and comps are objects keyed by slash paths
//! like `"enemies/slime/body"`, and comps reference parts by those path
//! strings. Version 2 (`.mqs`, a compressed directory archive) is
//! hierarchical and id-addressed: an explicit `folders` list derived from
//! the path prefixes, entity lists carrying integer `id`/`parent` fields,
//! and comp→part references resolved to part ids.
//!
//! The conversion is a single synchronous pass over one in-memory manifest:
//!
//! 1. Extract the input archive to a scoped staging directory
//!    ([`core::archive`], traversal-safe).
//! 2. Rewrite the manifest ([`core::migrate`]): gate on `version == 1`,
//!    migrate parts, then comps, then flatten the shared folder tree.
//! 3. Drop `prefs.json`, repack the staging tree as a zip, pretty-printed
//!    manifest included.
//!
//! Auxiliary file bytes are never touched. A failed run leaves no output
//! archive behind.
//!
//! # Crate Structure
//!
//! - [`core::ids`]: run-scoped identifier allocation
//! - [`core::folders`]: folder tree builder and flattener
//! - [`core::manifest`]: version 2 data model and name splitting
//! - [`core::migrate`]: migration orchestrator and reference resolver
//! - [`core::archive`]: tar extraction and zip repackaging

pub mod core;

use crate::core::archive;
use crate::core::error::MigrateError;
use crate::core::migrate;
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "spritemig",
    version = env!("CARGO_PKG_VERSION"),
    about = "Convert a version 1 sprite project archive (.tar) into a version 2 package (.mqs)"
)]
struct Cli {
    /// Version 1 sprite project archive (.tar)
    input: PathBuf,
    /// Destination path for the version 2 package (.mqs)
    output: PathBuf,
}

/// CLI entry point: parse arguments and run one conversion.
pub fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();
    convert_project(&cli.input, &cli.output)
}

/// Converts one version 1 project archive into a version 2 package.
///
/// The staging directory is scoped to this call and released on success and
/// failure alike. No output file exists unless the whole pipeline succeeded.
pub fn convert_project(input: &Path, output: &Path) -> Result<(), MigrateError> {
    let staging = tempfile::tempdir()?;

    println!(
        "{} {} to staging area",
        "Extracting".bright_cyan(),
        input.display()
    );
    archive::extract_tar(input, staging.path())?;

    let manifest_path = staging.path().join(archive::MANIFEST_NAME);
    if !manifest_path.exists() {
        return Err(MigrateError::MalformedManifest(format!(
            "archive has no {} entry",
            archive::MANIFEST_NAME
        )));
    }
    let manifest: serde_json::Value = serde_json::from_str(&fs::read_to_string(&manifest_path)?)?;

    println!("{} manifest schema 1 → 2", "Upgrading".bright_cyan());
    let migrated = migrate::migrate_manifest(manifest)?;
    fs::write(&manifest_path, serde_json::to_string_pretty(&migrated)?)?;

    archive::remove_excluded_entries(staging.path())?;

    println!("{} {}", "Writing".bright_cyan(), output.display());
    archive::pack_zip(staging.path(), output)?;

    println!("{}", "Done".bright_green());
    Ok(())
}
