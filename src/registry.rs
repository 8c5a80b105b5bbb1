//! The build registry.
//!
//! An ordered map from virtual output path (`/fetch.js`, `/images/fetch.svg`)
//! to the [`Entity`] producing that file. Legacy paths are kept working
//! through a separate alias table whose entries share the canonical entity's
//! `Rc`, so an alias and its target are the same instance.
//!
//! The registry has a two-phase life per build: the builder fills it through
//! `&mut self` (`put`, `alias`), then hands it out as `&Registry` for reading,
//! validation, export and localization. Derived entities only ever see the
//! shared reference, so they can never observe a half-built registry.

use crate::entity::{Entity, EntityError};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("No entity at {0}")]
    NotFound(String),
    #[error("Cannot alias {alias} to {target}: {target} does not exist")]
    MissingAliasTarget { alias: String, target: String },
    #[error("Cannot alias {0}: an entity already exists at that path")]
    AliasShadowsEntity(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: EntityError,
    },
}

#[derive(Default)]
pub struct Registry {
    entries: Vec<(String, Rc<dyn Entity>)>,
    index: HashMap<String, usize>,
    aliases: Vec<(String, Rc<dyn Entity>)>,
    alias_index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entity` at `path`.
    ///
    /// Writing a path twice replaces the earlier entity in place: the path
    /// keeps its original position and a warning is logged.
    pub fn put(&mut self, path: impl Into<String>, entity: Rc<dyn Entity>) {
        let path = path.into();
        if let Some(&i) = self.index.get(&path) {
            tracing::warn!(path = %path, "Duplicate output path, replacing earlier entity");
            self.entries[i].1 = entity;
            return;
        }
        tracing::debug!(path = %path, kind = ?entity.kind(), "Registered");
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push((path, entity));
    }

    /// Look up `path`, then `path.html`, then `path` + `index.html`.
    pub fn get(&self, path: &str) -> Option<&Rc<dyn Entity>> {
        [
            path.to_string(),
            format!("{path}.html"),
            format!("{path}index.html"),
        ]
        .iter()
        .find_map(|candidate| self.lookup(candidate))
    }

    fn lookup(&self, path: &str) -> Option<&Rc<dyn Entity>> {
        if let Some(&i) = self.index.get(path) {
            return Some(&self.entries[i].1);
        }
        self.alias_index.get(path).map(|&i| &self.aliases[i].1)
    }

    /// Make `old` resolve to the entity currently stored at `new`.
    pub fn alias(&mut self, old: &str, new: &str) -> Result<(), RegistryError> {
        if self.index.contains_key(old) {
            return Err(RegistryError::AliasShadowsEntity(old.to_string()));
        }
        let target = self
            .lookup(new)
            .cloned()
            .ok_or_else(|| RegistryError::MissingAliasTarget {
                alias: old.to_string(),
                target: new.to_string(),
            })?;

        if let Some(&i) = self.alias_index.get(old) {
            self.aliases[i].1 = target;
        } else {
            self.alias_index.insert(old.to_string(), self.aliases.len());
            self.aliases.push((old.to_string(), target));
        }
        tracing::debug!(alias = old, target = new, "Aliased");
        Ok(())
    }

    /// Canonical entries in insertion order. Aliases are not included.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Rc<dyn Entity>)> {
        self.entries.iter().map(|(p, e)| (p.as_str(), e))
    }

    /// Every output path: canonical entries first, then aliases.
    pub fn all_entries(&self) -> impl Iterator<Item = (&str, &Rc<dyn Entity>)> {
        self.entries
            .iter()
            .chain(self.aliases.iter())
            .map(|(p, e)| (p.as_str(), e))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.all_entries().map(|(p, _)| p)
    }

    pub fn alias_paths(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(|(p, _)| p.as_str())
    }

    /// Number of canonical entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Content of the entity at `path`.
    pub fn read(&self, path: &str) -> Result<Vec<u8>, RegistryError> {
        let entity = self
            .get(path)
            .ok_or_else(|| RegistryError::NotFound(path.to_string()))?;
        entity.read(self).map_err(|source| RegistryError::Read {
            path: path.to_string(),
            source,
        })
    }

    /// Write every entity, aliases included, to `root/<virtual path>`.
    pub fn export(&self, root: &Path) -> Result<usize, RegistryError> {
        let mut written = 0;
        for (path, entity) in self.all_entries() {
            let bytes = entity.read(self).map_err(|source| RegistryError::Read {
                path: path.to_string(),
                source,
            })?;
            let dest = root.join(path.trim_start_matches('/'));
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, bytes)?;
            written += 1;
        }
        tracing::debug!(files = written, root = %root.display(), "Exported");
        Ok(written)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries.iter().map(|(p, _)| p).collect::<Vec<_>>())
            .field("aliases", &self.aliases.iter().map(|(p, _)| p).collect::<Vec<_>>())
            .finish()
    }
}
