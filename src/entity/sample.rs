//! Sample projects.
//!
//! A sample is a project archive showing one or more gallery scripts in use.
//! Its `project.json` lists the scripts it loads under `extensionURLs`; the
//! builder uses those URLs to attach the sample to each script's listing.

use super::{Entity, EntityError, EntityKind};
use crate::archive;
use crate::config::RulesConfig;
use crate::naming;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Archive entry holding the project manifest.
pub const PROJECT_MANIFEST: &str = "project.json";

#[derive(Debug, Clone)]
pub struct SampleFile {
    path: PathBuf,
    rules: Rc<RulesConfig>,
}

impl SampleFile {
    pub fn new(path: impl Into<PathBuf>, rules: Rc<RulesConfig>) -> Self {
        Self {
            path: path.into(),
            rules,
        }
    }

    /// Base name of the archive (`Fetch Demo.sb3`).
    pub fn slug(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Base name without the archive extension (`Fetch Demo`).
    pub fn title(&self) -> String {
        naming::sample_title(&self.slug())
    }

    /// Script URLs the project loads.
    pub fn script_urls(&self) -> Result<Vec<String>, EntityError> {
        let bytes = archive::read_entry(&self.path, PROJECT_MANIFEST)?;
        let project: serde_json::Value = serde_json::from_slice(&bytes)?;
        let urls = project
            .get("extensionURLs")
            .and_then(|v| v.as_object())
            .map(|urls| {
                urls.values()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(urls)
    }
}

impl Entity for SampleFile {
    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Sample
    }

    fn validate(&self) -> Result<(), EntityError> {
        let urls = self.script_urls()?;
        if urls.is_empty() {
            return Err(EntityError::invalid("Has no extensions"));
        }

        for url in &urls {
            let allowed = self
                .rules
                .sample_url_prefixes
                .iter()
                .any(|prefix| url.starts_with(prefix.as_str()));
            if !allowed || !url.ends_with(".js") {
                return Err(EntityError::invalid(format!(
                    "Invalid extension URL for sample: {url}"
                )));
            }
        }
        Ok(())
    }
}
