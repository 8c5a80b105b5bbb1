//! Passthrough entities.

use super::{Entity, EntityError};
use crate::registry::Registry;
use std::path::{Path, PathBuf};

/// A file copied verbatim from disk.
#[derive(Debug, Clone)]
pub struct PlainFile {
    path: PathBuf,
}

impl PlainFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Entity for PlainFile {
    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// A file compiled into the binary (support scripts for rendered pages).
#[derive(Debug, Clone)]
pub struct EmbeddedFile {
    content_type: &'static str,
    bytes: &'static [u8],
}

impl EmbeddedFile {
    pub fn new(content_type: &'static str, bytes: &'static [u8]) -> Self {
        Self {
            content_type,
            bytes,
        }
    }
}

impl Entity for EmbeddedFile {
    fn content_type(&self) -> String {
        self.content_type.to_string()
    }

    fn read(&self, _registry: &Registry) -> Result<Vec<u8>, EntityError> {
        Ok(self.bytes.to_vec())
    }
}
