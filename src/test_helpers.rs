//! Shared test utilities.
//!
//! Fixture writers for every source file type (scripts, PNG and SVG banners,
//! sample archives) plus [`TestProject`], a complete throwaway project tree.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = TestProject::standard();
//! let registry = project.builder(Mode::Production).build().unwrap();
//! assert!(registry.get("/fetch.js").is_some());
//! ```

use crate::builder::Builder;
use crate::config::{GalleryConfig, Mode};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Source files
// =========================================================================

/// Header of a featured script that passes validation.
///
/// The description is `"{name} does things."` and the ID is the slug.
pub fn script_source(slug: &str, name: &str) -> String {
    format!(
        "// ID: {slug}\n// Name: {name}\n// Description: {name} does things.\n// License: MPL-2.0\n"
    )
}

/// Write a blank PNG of the given size.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    image::RgbImage::new(width, height).save(&path).unwrap();
    path
}

/// Write an SVG with explicit `width`/`height` attributes.
pub fn write_svg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(
        &path,
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><rect width="10" height="10"/></svg>"#
        ),
    )
    .unwrap();
    path
}

/// Write a zip archive holding `entries`.
pub fn write_zip(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    let mut zip = zip::ZipWriter::new(fs::File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (entry, bytes) in entries {
        zip.start_file(*entry, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
    path
}

/// Write a sample project whose manifest loads `urls`.
pub fn write_sample(dir: &Path, name: &str, urls: &[&str]) -> PathBuf {
    let extension_urls: serde_json::Map<String, serde_json::Value> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| (format!("ext{i}"), serde_json::Value::from(*url)))
        .collect();
    let project = serde_json::json!({
        "targets": [],
        "extensions": [],
        "extensionURLs": extension_urls,
    });
    write_zip(
        dir,
        name,
        &[("project.json", project.to_string().as_bytes())],
    )
}

// =========================================================================
// Whole projects
// =========================================================================

/// A project tree in a temp directory.
///
/// `standard()` holds:
///
/// ```text
/// extensions/extensions.json   ["fetch"] (with a comment and trailing comma)
/// extensions/fetch.js          featured, valid, one runtime string
/// extensions/Lily/Cast.js      not featured
/// images/fetch.svg             600x300
/// images/unknown.svg           600x300 placeholder
/// samples/Fetch Demo.sb3       loads fetch.js
/// docs/fetch.md
/// website/robots.txt
/// translations/extension-metadata.json   de: fetch@name = Holen
/// translations/extension-runtime.json    de: fetch@Fetch data = Daten holen
/// ```
pub struct TestProject {
    tmp: TempDir,
}

impl TestProject {
    pub fn empty() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    pub fn standard() -> Self {
        let project = Self::empty();
        project.write(
            "extensions/extensions.json",
            "[\n  // Networking\n  \"fetch\",\n]\n",
        );
        project.write(
            "extensions/fetch.js",
            &format!(
                "{}\n(function (Scratch) {{\n  Scratch.translate(\"Fetch data\");\n}})(Scratch);\n",
                script_source("fetch", "Fetch")
            ),
        );
        project.write("extensions/Lily/Cast.js", "// Name: Cast\nrun();\n");

        let images = project.root().join("images");
        write_svg(&images, "fetch.svg", 600, 300);
        write_svg(&images, "unknown.svg", 600, 300);

        write_sample(
            &project.root().join("samples"),
            "Fetch Demo.sb3",
            &["https://extensions.turbowarp.org/extensions/fetch.js"],
        );

        project.write("docs/fetch.md", "# Fetch\n\n```scratch\nsay [hi]\n```\n");
        project.write("website/robots.txt", "User-agent: *\n");
        project.write(
            "translations/extension-metadata.json",
            r#"{"de": {"fetch@name": "Holen"}}"#,
        );
        project.write(
            "translations/extension-runtime.json",
            r#"{"de": {"fetch@Fetch data": "Daten holen"}}"#,
        );
        project
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    /// Write `content` at `relative`, creating directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Builder over this project with the stock config.
    pub fn builder(&self, mode: Mode) -> Builder {
        Builder::new(self.root(), GalleryConfig::default(), mode)
    }
}
