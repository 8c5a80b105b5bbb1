//! Build entities.
//!
//! An entity is one file of the output site: either a source file read from
//! disk (scripts, images, samples, docs, website assets) or an artifact
//! derived from the rest of the build (homepage, catalog, sitemap).
//!
//! Every entity implements [`Entity`]. The trait's default methods describe
//! a plain file copied verbatim from its source path; variants override only
//! what they change:
//!
//! | Variant | read | validate | strings |
//! |---|---|---|---|
//! | [`PlainFile`] | bytes as-is | - | - |
//! | [`ScriptFile`] | l10n injected | metadata rules (featured) | name/description + runtime strings (featured) |
//! | [`ImageFile`] | bytes as-is | 2:1 aspect, no SVG `<text>` | - |
//! | [`SampleFile`] | bytes as-is | allow-listed script URLs | - |
//! | [`DocsFile`] | markdown → HTML | - | - |
//! | [`generated`](crate::generated) | computed from the registry | - | - |

pub mod docs;
pub mod image;
pub mod plain;
pub mod sample;
pub mod script;

pub use docs::DocsFile;
pub use image::{ImageFile, ImageKind};
pub use plain::{EmbeddedFile, PlainFile};
pub use sample::SampleFile;
pub use script::ScriptFile;

use crate::archive::ArchiveError;
use crate::naming;
use crate::registry::Registry;
use crate::translations::EntityStrings;
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EntityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
    #[error("Image error: {0}")]
    Image(#[from] ::image::ImageError),
    /// The entity breaks one of its rules. Collected by validation.
    #[error("{0}")]
    Invalid(String),
    #[error("Could not extract strings: {0}")]
    Strings(String),
    #[error("Featured extension {0} has no script")]
    UnknownFeatured(String),
    #[error("Entity has no source file")]
    NoSource,
}

impl EntityError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Broad category of an entity, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Script,
    Image,
    Sample,
    Docs,
    Generated,
    Plain,
}

/// One file of the build.
///
/// `read` receives the finished [`Registry`]: derived entities look at the
/// rest of the build when their content is requested, never before.
pub trait Entity {
    /// Where the entity's bytes come from, if anywhere.
    fn source_path(&self) -> Option<&Path> {
        None
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Plain
    }

    /// File extension of the output, including the dot (`".html"`).
    fn content_type(&self) -> String {
        self.source_path()
            .map(|p| naming::extension_of(&p.to_string_lossy()).to_string())
            .unwrap_or_default()
    }

    /// Output bytes.
    fn read(&self, _registry: &Registry) -> Result<Vec<u8>, EntityError> {
        let path = self.source_path().ok_or(EntityError::NoSource)?;
        Ok(fs::read(path)?)
    }

    /// Modification time of the source; `None` for derived entities.
    fn last_modified(&self) -> Result<Option<SystemTime>, EntityError> {
        match self.source_path() {
            Some(path) => Ok(Some(fs::metadata(path)?.modified()?)),
            None => Ok(None),
        }
    }

    /// Check the entity's rules. Stops at the first broken rule.
    fn validate(&self) -> Result<(), EntityError> {
        Ok(())
    }

    /// Strings this entity offers to translators, `group -> key -> string`.
    fn strings(&self) -> Result<Option<EntityStrings>, EntityError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Derived;

    impl Entity for Derived {
        fn kind(&self) -> EntityKind {
            EntityKind::Generated
        }

        fn read(&self, _registry: &Registry) -> Result<Vec<u8>, EntityError> {
            Ok(b"derived".to_vec())
        }
    }

    #[test]
    fn derived_entity_defaults() {
        let d = Derived;
        assert_eq!(d.content_type(), "");
        assert!(d.last_modified().unwrap().is_none());
        assert!(d.validate().is_ok());
        assert!(d.strings().unwrap().is_none());
    }

    #[test]
    fn plain_file_defaults_come_from_source() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("style.css");
        fs::write(&path, "body {}").unwrap();
        let file = PlainFile::new(&path);

        assert_eq!(file.content_type(), ".css");
        assert!(file.last_modified().unwrap().is_some());
        assert_eq!(file.read(&Registry::new()).unwrap(), b"body {}");
    }

    #[test]
    fn invalid_error_displays_message_only() {
        let err = EntityError::invalid("Missing // ID:");
        assert_eq!(err.to_string(), "Missing // ID:");
    }
}
