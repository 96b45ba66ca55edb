use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),
    #[error("Manifest version is {found}, expected 1")]
    VersionMismatch { found: String },
    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),
    #[error("Malformed entity name: {0}")]
    MalformedName(String),
    #[error("Comp '{comp}' references unknown part '{part}'")]
    DanglingPartRef { comp: String, part: String },
    #[error("Archive entry escapes the staging directory: {0}")]
    PathTraversal(String),
}
