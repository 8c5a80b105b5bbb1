//! The assembler.
//!
//! One call to [`Builder::build`] scans every source root and produces a
//! fresh [`Registry`]. Nothing is carried over between builds: the watch
//! loop simply calls `build` again.
//!
//! ## Build steps
//!
//! 1. Load the featured list (`extensions/extensions.json`).
//! 2. Load the translation catalogs.
//! 3. Scripts: every `*.js` under the extensions root → `/{name}`.
//! 4. Images: `*.png`, `*.jpg`, `*.svg` → `/images/{name}`, indexed by slug
//!    (except the placeholder `unknown`).
//! 5. Samples: `*.sb3`, `*.pmp` → `/samples/{name}`, indexed under every
//!    slug their manifest references.
//! 6. Website assets → `/{name}`, copied verbatim.
//! 7. Unless in desktop mode: docs (`/{slug}.html`), the docs support script,
//!    the homepage and the sitemap.
//! 8. The catalog.
//! 9. Configured aliases.
//!
//! ## Source layout
//!
//! ```text
//! project/
//! ├── gallery.toml              # Optional config
//! ├── extensions/
//! │   ├── extensions.json       # Featured slugs, in display order
//! │   ├── fetch.js
//! │   └── Lily/Cast.js
//! ├── images/fetch.svg
//! ├── samples/Fetch Demo.sb3
//! ├── docs/fetch.md
//! ├── website/robots.txt
//! └── translations/extension-runtime.json
//! ```

use crate::config::{self, ConfigError, GalleryConfig, Mode};
use crate::entity::docs::{SUPPORT_SCRIPT, SUPPORT_SCRIPT_PATH};
use crate::entity::{
    DocsFile, EmbeddedFile, EntityError, ImageFile, ImageKind, PlainFile, SampleFile,
    ScriptFile,
};
use crate::generated::{
    CATALOG_PATH, Catalog, CrossRefs, HOMEPAGE_PATH, Homepage, SITEMAP_PATH, Sitemap, UrlBuilder,
};
use crate::naming;
use crate::registry::{Registry, RegistryError};
use crate::translations::{self, METADATA_GROUP, RUNTIME_GROUP, TranslationError};
use crate::validate::{self, ValidationFailure};
use crate::walk;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;
use thiserror::Error;

/// Image slug reserved for the placeholder banner.
const PLACEHOLDER_IMAGE_SLUG: &str = "unknown";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Translation error: {0}")]
    Translations(#[from] TranslationError),
    #[error("Failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Failed to read featured list {path}: {source}")]
    FeaturedIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid featured list {path}: {source}")]
    FeaturedJson {
        path: PathBuf,
        source: json5::Error,
    },
    #[error("{path}: {source}")]
    Entity {
        path: String,
        #[source]
        source: EntityError,
    },
    #[error("Alias error: {0}")]
    Alias(#[from] RegistryError),
    #[error("Alias cycle through {0}")]
    AliasCycle(String),
    #[error("Output directory {output} overlaps {source_root}")]
    OutputOverlapsSources {
        output: PathBuf,
        source_root: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct Builder {
    root: PathBuf,
    config: GalleryConfig,
    mode: Mode,
}

impl Builder {
    pub fn new(root: impl Into<PathBuf>, config: GalleryConfig, mode: Mode) -> Self {
        Self {
            root: root.into(),
            config,
            mode,
        }
    }

    /// Builder for a project root, reading `gallery.toml` if present.
    pub fn from_root(root: impl Into<PathBuf>, mode: Mode) -> Result<Self, ConfigError> {
        let root = root.into();
        let config = config::load_config(&root)?;
        Ok(Self::new(root, config, mode))
    }

    fn source(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Every directory whose changes should trigger a rebuild.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let paths = &self.config.paths;
        [
            &paths.extensions,
            &paths.images,
            &paths.website,
            &paths.docs,
            &paths.samples,
            &paths.translations,
        ]
        .into_iter()
        .map(|p| self.source(p))
        .collect()
    }

    /// Refuse an output directory that is, or contains, the project root or
    /// a source root, or that lies inside a source root.
    ///
    /// The CLI empties the output directory before exporting, so this must
    /// pass first.
    pub fn check_output_dir(&self, out_dir: &Path) -> Result<(), BuildError> {
        let output = normalize(out_dir);
        let root = normalize(&self.root);
        if root.starts_with(&output) {
            return Err(BuildError::OutputOverlapsSources {
                output,
                source_root: root,
            });
        }
        for source_root in self.watch_roots() {
            let source_root = normalize(&source_root);
            if source_root.starts_with(&output) || output.starts_with(&source_root) {
                return Err(BuildError::OutputOverlapsSources {
                    output,
                    source_root,
                });
            }
        }
        Ok(())
    }

    /// Assemble a complete registry.
    pub fn build(&self) -> Result<Registry, BuildError> {
        let paths = &self.config.paths;
        let rules = Rc::new(self.config.rules.clone());
        let mut registry = Registry::new();
        let mut refs = CrossRefs::default();

        // 1. Featured list
        refs.featured = load_featured(&self.source(&paths.featured))?;
        let featured: HashSet<&str> = refs.featured.iter().map(String::as_str).collect();

        // 2. Translations
        let catalogs = translations::load_translations(&self.source(&paths.translations))?;
        let runtime = Rc::new(catalogs.group(RUNTIME_GROUP));

        // 3. Scripts
        for entry in walk::walk_files(&self.source(&paths.extensions))? {
            if !entry.name.ends_with(".js") {
                continue;
            }
            let slug = naming::slug_of(&entry.name).to_string();
            let script = Rc::new(ScriptFile::new(
                &entry.path,
                slug.clone(),
                featured.contains(slug.as_str()),
                Rc::clone(&runtime),
                Rc::clone(&rules),
                self.mode,
            ));
            registry.put(format!("/{}", entry.name), script.clone());
            refs.scripts.insert(slug, script);
        }

        // 4. Images
        for entry in walk::walk_files(&self.source(&paths.images))? {
            let Some(kind) = ImageKind::from_extension(naming::extension_of(&entry.name)) else {
                continue;
            };
            let slug = naming::slug_of(&entry.name);
            if slug != PLACEHOLDER_IMAGE_SLUG {
                refs.images
                    .insert(slug.to_string(), format!("images/{}", entry.name));
            }
            registry.put(
                format!("/images/{}", entry.name),
                Rc::new(ImageFile::new(&entry.path, kind)),
            );
        }

        // 5. Samples
        for entry in walk::walk_files(&self.source(&paths.samples))? {
            if !naming::is_sample_archive(&entry.name) {
                continue;
            }
            let virtual_path = format!("/samples/{}", entry.name);
            let sample = Rc::new(SampleFile::new(&entry.path, Rc::clone(&rules)));
            let urls = sample.script_urls().map_err(|source| BuildError::Entity {
                path: virtual_path.clone(),
                source,
            })?;
            // A script loaded from both hosts still lists the sample once
            let mut slugs = BTreeSet::new();
            for url in urls {
                match naming::slug_from_script_url(&url, &rules.sample_url_prefixes) {
                    Some(slug) => {
                        slugs.insert(slug);
                    }
                    None => {
                        tracing::debug!(sample = %entry.name, url = %url, "Unparseable script URL");
                    }
                }
            }
            for slug in slugs {
                refs.samples.entry(slug).or_default().push(Rc::clone(&sample));
            }
            registry.put(virtual_path, sample);
        }

        // 6. Website assets
        for entry in walk::walk_files(&self.source(&paths.website))? {
            registry.put(format!("/{}", entry.name), Rc::new(PlainFile::new(&entry.path)));
        }

        // 7. Docs, homepage, sitemap
        if self.mode.builds_website() {
            for entry in walk::walk_files(&self.source(&paths.docs))? {
                if !entry.name.ends_with(".md") {
                    continue;
                }
                let slug = naming::slug_of(&entry.name).to_string();
                registry.put(
                    format!("/{slug}.html"),
                    Rc::new(DocsFile::new(&entry.path, slug.clone())),
                );
                refs.with_docs.insert(slug);
            }
            registry.put(
                SUPPORT_SCRIPT_PATH,
                Rc::new(EmbeddedFile::new(".js", SUPPORT_SCRIPT)),
            );
        }

        refs.metadata_translations = catalogs.group(METADATA_GROUP);
        let refs = Rc::new(refs);

        if self.mode.builds_website() {
            let urls = UrlBuilder::new(
                self.config.hosts.script_host(self.mode),
                self.config.hosts.editor.clone(),
            );
            registry.put(
                HOMEPAGE_PATH,
                Rc::new(Homepage::new(Rc::clone(&refs), urls, self.mode)),
            );
            registry.put(
                SITEMAP_PATH,
                Rc::new(Sitemap::new(self.config.hosts.sitemap.clone())),
            );
        }

        // 8. Catalog
        registry.put(CATALOG_PATH, Rc::new(Catalog::new(Rc::clone(&refs))));

        // 9. Aliases, each pointed at the canonical end of its chain
        for (old, new) in &self.config.aliases {
            let target = resolve_alias_target(&self.config.aliases, new)?;
            registry.alias(old, target)?;
        }

        tracing::debug!(
            entries = registry.len(),
            aliases = registry.alias_count(),
            mode = %self.mode,
            "Assembled"
        );
        Ok(registry)
    }

    /// [`build`](Self::build), logging the elapsed time or the failure.
    ///
    /// Returns `None` when the build failed.
    pub fn try_build(&self) -> Option<Registry> {
        let start = Instant::now();
        tracing::info!("Building...");
        match self.build() {
            Ok(registry) => {
                tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "Build completed");
                Some(registry)
            }
            Err(e) => {
                tracing::error!(error = %e, "Build failed");
                None
            }
        }
    }

    /// Build, then validate every entity.
    pub fn validate(&self) -> Result<Vec<ValidationFailure>, BuildError> {
        let registry = self.build()?;
        Ok(validate::validate_registry(&registry))
    }
}

/// Read the featured list: a JSON array of slugs that may carry comments and
/// trailing commas.
pub fn load_featured(path: &Path) -> Result<Vec<String>, BuildError> {
    let text = fs::read_to_string(path).map_err(|source| BuildError::FeaturedIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_featured_list(&text).map_err(|source| BuildError::FeaturedJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Absolute form of `path`: `.` and `..` resolved lexically, then symlinks
/// resolved on the part of the path that exists.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => {
                lexical.pop();
            }
            Component::CurDir => {}
            other => lexical.push(other),
        }
    }

    let mut existing = lexical.as_path();
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => break,
        }
    }
    let mut resolved = existing
        .canonicalize()
        .unwrap_or_else(|_| existing.to_path_buf());
    for name in missing.iter().rev() {
        resolved.push(name);
    }
    resolved
}

/// Follow `aliases` from `target` to the first path that is not itself an
/// alias, so the order in which aliases are applied does not matter.
fn resolve_alias_target<'a>(
    aliases: &'a BTreeMap<String, String>,
    target: &'a str,
) -> Result<&'a str, BuildError> {
    let mut current = target;
    for _ in 0..=aliases.len() {
        match aliases.get(current) {
            Some(next) => current = next.as_str(),
            None => return Ok(current),
        }
    }
    Err(BuildError::AliasCycle(target.to_string()))
}

/// Parse a featured list. Comments and trailing commas are allowed.
pub fn parse_featured_list(text: &str) -> Result<Vec<String>, json5::Error> {
    json5::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn featured_list_allows_comments_and_trailing_commas() {
        let text = r#"[
            // Networking
            "fetch",
            /* graphics */ "Lily/Cast",
            "http://not-a-comment",
        ]"#;
        assert_eq!(
            parse_featured_list(text).unwrap(),
            vec!["fetch", "Lily/Cast", "http://not-a-comment"]
        );
    }

    #[test]
    fn featured_list_escaped_quote() {
        assert_eq!(
            parse_featured_list(r#"["a\"//b",]"#).unwrap(),
            vec![r#"a"//b"#]
        );
    }

    #[test]
    fn malformed_featured_list_is_error() {
        let project = TestProject::empty();
        project.write("extensions/extensions.json", "[\"fetch\"");
        assert!(matches!(
            project.builder(Mode::Production).build(),
            Err(BuildError::FeaturedJson { .. })
        ));
    }

    #[test]
    fn missing_featured_list_is_error() {
        let tmp = TempDir::new().unwrap();
        let builder = Builder::new(tmp.path(), GalleryConfig::default(), Mode::Production);
        assert!(matches!(
            builder.build(),
            Err(BuildError::FeaturedIo { .. })
        ));
    }

    #[test]
    fn production_build_has_every_artifact() {
        let project = TestProject::standard();
        let registry = project.builder(Mode::Production).build().unwrap();

        for path in [
            "/fetch.js",
            "/Lily/Cast.js",
            "/images/fetch.svg",
            "/images/unknown.svg",
            "/samples/Fetch Demo.sb3",
            "/robots.txt",
            "/fetch.html",
            SUPPORT_SCRIPT_PATH,
            HOMEPAGE_PATH,
            SITEMAP_PATH,
            CATALOG_PATH,
        ] {
            assert!(registry.get(path).is_some(), "missing {path}");
        }
    }

    #[test]
    fn desktop_build_has_catalog_only() {
        let project = TestProject::standard();
        let registry = project.builder(Mode::Desktop).build().unwrap();

        assert!(registry.get(CATALOG_PATH).is_some());
        assert!(registry.get("/fetch.js").is_some());
        assert!(registry.get(HOMEPAGE_PATH).is_none());
        assert!(registry.get(SITEMAP_PATH).is_none());
        assert!(registry.get("/fetch.html").is_none());
        assert!(registry.get(SUPPORT_SCRIPT_PATH).is_none());
    }

    #[test]
    fn catalog_reflects_cross_references() {
        let project = TestProject::standard();
        let registry = project.builder(Mode::Production).build().unwrap();
        let catalog: serde_json::Value =
            serde_json::from_slice(&registry.read(CATALOG_PATH).unwrap()).unwrap();

        let fetch = &catalog["extensions"][0];
        assert_eq!(fetch["slug"], "fetch");
        assert_eq!(fetch["image"], "images/fetch.svg");
        assert_eq!(fetch["docs"], true);
        assert_eq!(fetch["samples"], serde_json::json!(["Fetch Demo"]));
        assert_eq!(fetch["nameTranslations"], serde_json::json!({"de": "Holen"}));
    }

    #[test]
    fn placeholder_image_is_not_indexed() {
        let project = TestProject::standard();
        fs::write(
            project.root().join("extensions/extensions.json"),
            r#"["fetch", "unknown"]"#,
        )
        .unwrap();
        fs::write(
            project.root().join("extensions/unknown.js"),
            script_source("unknown", "Unknown"),
        )
        .unwrap();
        let registry = project.builder(Mode::Production).build().unwrap();
        let catalog: serde_json::Value =
            serde_json::from_slice(&registry.read(CATALOG_PATH).unwrap()).unwrap();
        assert!(catalog["extensions"][1].get("image").is_none());
    }

    #[test]
    fn aliases_are_applied() {
        let project = TestProject::standard();
        let mut config = GalleryConfig::default();
        config
            .aliases
            .insert("/old-fetch.js".into(), "/fetch.js".into());
        let registry = Builder::new(project.root(), config, Mode::Production)
            .build()
            .unwrap();
        assert!(Rc::ptr_eq(
            registry.get("/old-fetch.js").unwrap(),
            registry.get("/fetch.js").unwrap()
        ));
    }

    #[test]
    fn alias_to_missing_path_fails_build() {
        let project = TestProject::standard();
        let mut config = GalleryConfig::default();
        config.aliases.insert("/old.js".into(), "/gone.js".into());
        let result = Builder::new(project.root(), config, Mode::Production).build();
        assert!(matches!(result, Err(BuildError::Alias(_))));
    }

    #[test]
    fn alias_chain_resolves_regardless_of_key_order() {
        let project = TestProject::standard();
        let mut config = GalleryConfig::default();
        // "/a.js" sorts before the alias it targets
        config.aliases.insert("/a.js".into(), "/z.js".into());
        config.aliases.insert("/z.js".into(), "/fetch.js".into());
        let registry = Builder::new(project.root(), config, Mode::Production)
            .build()
            .unwrap();
        assert!(Rc::ptr_eq(
            registry.get("/a.js").unwrap(),
            registry.get("/fetch.js").unwrap()
        ));
        assert!(Rc::ptr_eq(
            registry.get("/z.js").unwrap(),
            registry.get("/fetch.js").unwrap()
        ));
    }

    #[test]
    fn alias_cycle_fails_build() {
        let project = TestProject::standard();
        let mut config = GalleryConfig::default();
        config.aliases.insert("/a.js".into(), "/b.js".into());
        config.aliases.insert("/b.js".into(), "/a.js".into());
        let result = Builder::new(project.root(), config, Mode::Production).build();
        assert!(matches!(result, Err(BuildError::AliasCycle(_))));
    }

    #[test]
    fn sample_loading_a_script_from_both_hosts_is_listed_once() {
        let project = TestProject::standard();
        write_sample(
            &project.root().join("samples"),
            "Demo.sb3",
            &[
                "https://extensions.turbowarp.org/extensions/fetch.js",
                "https://scsupercraft.github.io/extensions/fetch.js",
            ],
        );
        let registry = project.builder(Mode::Production).build().unwrap();
        let catalog: serde_json::Value =
            serde_json::from_slice(&registry.read(CATALOG_PATH).unwrap()).unwrap();
        assert_eq!(
            catalog["extensions"][0]["samples"],
            serde_json::json!(["Demo", "Fetch Demo"])
        );
    }

    #[test]
    fn try_build_swallows_failure() {
        let tmp = TempDir::new().unwrap();
        let builder = Builder::new(tmp.path(), GalleryConfig::default(), Mode::Production);
        assert!(builder.try_build().is_none());
    }

    #[test]
    fn validate_collects_failures() {
        let project = TestProject::standard();
        write_png(&project.root().join("images"), "bad.png", 800, 401);
        let failures = project.builder(Mode::Production).validate().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, "/images/bad.png");
    }

    #[test]
    fn output_dir_may_live_beside_the_sources() {
        let project = TestProject::standard();
        let builder = project.builder(Mode::Production);
        builder.check_output_dir(&project.root().join("build")).unwrap();
        builder
            .check_output_dir(&project.root().join("out/nested"))
            .unwrap();
    }

    #[test]
    fn output_dir_must_not_overlap_sources() {
        let project = TestProject::standard();
        let builder = project.builder(Mode::Production);
        for out in [
            project.root().to_path_buf(),
            project.root().join("."),
            project.root().join("website"),
            project.root().join("docs/generated"),
            project.root().join("build/.."),
        ] {
            assert!(
                matches!(
                    builder.check_output_dir(&out),
                    Err(BuildError::OutputOverlapsSources { .. })
                ),
                "accepted {}",
                out.display()
            );
        }
        let parent = project.root().parent().unwrap();
        assert!(builder.check_output_dir(parent).is_err());
    }

    #[test]
    fn watch_roots_cover_every_source() {
        let project = TestProject::standard();
        let roots = project.builder(Mode::Development).watch_roots();
        assert_eq!(roots.len(), 6);
        assert!(roots.contains(&project.root().join("translations")));
    }
}
