//! Recursive source-root walker.
//!
//! Every source root is read the same way: all regular files below it, as
//! `(relative name, absolute path)` pairs, with `/` separators in the
//! relative name regardless of platform. Entries are sorted by file name so
//! two runs over the same tree see the same order.
//!
//! A root that does not exist yields nothing; optional roots (docs, samples)
//! are routinely absent in small checkouts.

use std::path::{Path, PathBuf};

/// One file found under a source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the root, `/`-separated (`Lily/Cast.js`).
    pub name: String,
    pub path: PathBuf,
}

/// Walk `root` and collect every file below it.
pub fn walk_files(root: &Path) -> Result<Vec<WalkEntry>, walkdir::Error> {
    if !root.exists() {
        tracing::debug!(root = %root.display(), "source root missing, skipping");
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push(WalkEntry {
            name,
            path: entry.into_path(),
        });
    }
    Ok(entries)
}
