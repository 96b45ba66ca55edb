//! Core modules for the sprite project migration engine.
//!
//! The migration pipeline and its shared primitives live here.

pub mod archive;
pub mod error;
pub mod folders;
pub mod ids;
pub mod manifest;
pub mod migrate;
