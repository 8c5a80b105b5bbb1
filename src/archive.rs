//! Sample project archives.
//!
//! Sample projects are zip files. Only one entry is ever needed from them
//! (the project manifest), so this module exposes a single lookup.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("{0} missing")]
    MissingEntry(String),
}

/// Read the raw bytes of the entry called `name` from the archive at `path`.
pub fn read_entry(path: &Path, name: &str) -> Result<Vec<u8>, ArchiveError> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(ArchiveError::MissingEntry(name.to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    // The declared size comes from the archive header and is not trusted.
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn reads_named_entry() {
        let tmp = TempDir::new().unwrap();
        let path = write_zip(tmp.path(), "a.sb3", &[("project.json", b"{}".as_slice())]);
        assert_eq!(read_entry(&path, "project.json").unwrap(), b"{}");
    }

    #[test]
    fn reads_deflated_entry_larger_than_a_buffer() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.sb3");
        let body = "x".repeat(100_000);
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        zip.start_file("project.json", zip::write::SimpleFileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut zip, body.as_bytes()).unwrap();
        zip.finish().unwrap();
        assert_eq!(read_entry(&path, "project.json").unwrap(), body.as_bytes());
    }

    #[test]
    fn missing_entry_is_reported_by_name() {
        let tmp = TempDir::new().unwrap();
        let path = write_zip(tmp.path(), "a.sb3", &[("other.txt", b"x".as_slice())]);
        let err = read_entry(&path, "project.json").unwrap_err();
        assert!(matches!(err, ArchiveError::MissingEntry(_)));
        assert_eq!(err.to_string(), "project.json missing");
    }

    #[test]
    fn non_zip_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.sb3");
        std::fs::write(&path, "definitely not a zip").unwrap();
        assert!(matches!(
            read_entry(&path, "project.json"),
            Err(ArchiveError::Zip(_))
        ));
    }
}
