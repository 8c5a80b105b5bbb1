//! Derived artifacts.
//!
//! The homepage, the catalog, and the sitemap are entities like any other,
//! but their content is computed from the rest of the build when they are
//! read. The builder hands the homepage and catalog a shared [`CrossRefs`]
//! snapshot of its indices; the sitemap needs nothing but the finished
//! [`Registry`](crate::registry::Registry) it is read from.

pub mod catalog;
pub mod homepage;
pub mod sitemap;

pub use catalog::{CATALOG_PATH, Catalog};
pub use homepage::{HOMEPAGE_PATH, Homepage};
pub use sitemap::{SITEMAP_PATH, Sitemap};

use crate::entity::{EntityError, SampleFile, ScriptFile};
use crate::translations::LocaleCatalog;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Indices built by the builder while scanning, shared read-only by the
/// derived artifacts of one build.
#[derive(Debug, Default)]
pub struct CrossRefs {
    /// slug → script.
    pub scripts: BTreeMap<String, Rc<ScriptFile>>,
    /// slug → image path relative to the site root (`images/fetch.svg`).
    pub images: BTreeMap<String, String>,
    /// Featured slugs in curated order.
    pub featured: Vec<String>,
    /// Slugs with a documentation page.
    pub with_docs: BTreeSet<String>,
    /// slug → samples loading that script.
    pub samples: BTreeMap<String, Vec<Rc<SampleFile>>>,
    /// Translated names and descriptions (`{slug}@name`, `{slug}@description`).
    pub metadata_translations: LocaleCatalog,
}

impl CrossRefs {
    /// The script behind a featured slug.
    pub fn featured_script(&self, slug: &str) -> Result<&Rc<ScriptFile>, EntityError> {
        self.scripts
            .get(slug)
            .ok_or_else(|| EntityError::UnknownFeatured(slug.to_string()))
    }

    pub fn has_docs(&self, slug: &str) -> bool {
        self.with_docs.contains(slug)
    }

    pub fn samples_for(&self, slug: &str) -> &[Rc<SampleFile>] {
        self.samples.get(slug).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Builds the links shown on the homepage.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    host: String,
    editor: String,
}

impl UrlBuilder {
    /// `host` must end with `/`.
    pub fn new(host: impl Into<String>, editor: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            editor: editor.into(),
        }
    }

    /// `{host}{slug}.js`
    pub fn full_script(&self, slug: &str) -> String {
        format!("{}{slug}.js", self.host)
    }

    /// `{host}{slug}`
    pub fn docs(&self, slug: &str) -> String {
        format!("{}{slug}", self.host)
    }

    /// Open the editor with the script loaded.
    pub fn run_script(&self, slug: &str) -> String {
        format!("{}?extension={}", self.editor, self.full_script(slug))
    }

    /// Open the editor with a sample project loaded.
    pub fn run_sample(&self, file_name: &str) -> String {
        let path = format!("samples/{file_name}");
        format!(
            "{}?project_url={}{}",
            self.editor,
            self.host,
            encode_component(&path)
        )
    }
}

/// Percent-encode a URL component. Spaces become `%20`, not `+`.
fn encode_component(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
