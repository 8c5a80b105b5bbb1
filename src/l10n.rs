//! Localization merger.
//!
//! Collects the translatable strings of every entity into one catalog per
//! group, ready to hand to translators as `exported-<group>.json`.
//! Keys are `{slug}@{suffix}`; each key belongs to exactly one entity of the
//! build, whichever groups it lands in.

use crate::entity::EntityError;
use crate::registry::Registry;
use crate::translations::TranslatableString;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum L10nError {
    #[error("L10N collision: multiple instances of {key} in group {group}")]
    Collision { key: String, group: String },
    #[error("Error getting translations from {path}: {source}")]
    Entity {
        path: String,
        #[source]
        source: EntityError,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// `group -> key -> string` for the whole build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedStrings {
    groups: BTreeMap<String, BTreeMap<String, TranslatableString>>,
}

impl MergedStrings {
    pub fn groups(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, TranslatableString>)> {
        self.groups.iter().map(|(g, s)| (g.as_str(), s))
    }

    /// Total number of strings across groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Merge the strings of every entity in `registry`.
///
/// Any entity failing to produce its strings aborts the merge, as does a
/// key offered by two different entities. One entity may use the same key
/// in several groups.
pub fn generate(registry: &Registry) -> Result<MergedStrings, L10nError> {
    let mut merged = MergedStrings::default();
    // key -> path of the entity that first offered it
    let mut owners: HashMap<String, String> = HashMap::new();

    for (path, entity) in registry.entries() {
        let strings = entity.strings().map_err(|source| L10nError::Entity {
            path: path.to_string(),
            source,
        })?;
        let Some(strings) = strings else {
            continue;
        };
        tracing::debug!(path, groups = strings.len(), "Collected strings");

        for (group, entries) in strings {
            let target = merged.groups.entry(group.clone()).or_default();
            for (key, value) in entries {
                match owners.get(&key) {
                    Some(owner) if owner != path => {
                        return Err(L10nError::Collision { key, group });
                    }
                    Some(_) => {}
                    None => {
                        owners.insert(key.clone(), path.to_string());
                    }
                }
                target.insert(key, value);
            }
        }
    }
    Ok(merged)
}

/// Write one `exported-<group>.json` per group into `root`.
pub fn export(merged: &MergedStrings, root: &Path) -> Result<Vec<PathBuf>, L10nError> {
    fs::create_dir_all(root)?;
    let mut written = Vec::new();
    for (group, strings) in merged.groups() {
        let path = root.join(format!("exported-{group}.json"));
        fs::write(&path, serde_json::to_string_pretty(strings)?)?;
        tracing::debug!(path = %path.display(), "Wrote l10n export");
        written.push(path);
    }
    Ok(written)
}
