//! Project configuration.
//!
//! Handles loading, validating, and merging `gallery.toml`. Stock defaults are
//! serialized to a TOML value, the user file (if any) is merged on top, and
//! the result is deserialized with unknown keys rejected.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── gallery.toml            # Optional, overrides stock defaults
//! ├── extensions/             # Script sources + extensions.json (featured list)
//! ├── images/                 # Banner images, one per slug
//! ├── samples/                # Sample projects (.sb3 / .pmp)
//! ├── website/                # Static website assets, copied as-is
//! ├── docs/                   # Markdown documentation, one per slug
//! └── translations/           # <group>.json translation catalogs
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! [paths]
//! extensions = "extensions"
//! featured = "extensions/extensions.json"
//! images = "images"
//! samples = "samples"
//! website = "website"
//! docs = "docs"
//! translations = "translations"
//!
//! [hosts]
//! development = "http://localhost:8000/"
//! production = "https://scsupercraft.github.io/extensions/"
//! sitemap = "https://extensions.turbowarp.org"
//! editor = "https://turbowarp.org/editor"
//!
//! [rules]
//! profile_link_prefix = "https://scratch.mit.edu/users/"
//! sample_url_prefixes = [
//!     "https://scsupercraft.github.io/extensions/",
//!     "https://extensions.turbowarp.org/extensions/",
//! ]
//!
//! [aliases]
//! "/old-name.js" = "/new-name.js"
//! ```
//!
//! Config files are sparse; override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project configuration file.
pub const CONFIG_FILENAME: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Which flavor of the site a build produces.
///
/// Selected explicitly by the caller and handed to the
/// [`Builder`](crate::builder::Builder); nothing reads it from the process
/// environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Local preview: no l10n injection, localhost URLs.
    Development,
    /// Public website: l10n injected, public URLs, docs + homepage + sitemap.
    Production,
    /// Bundled into the desktop app: l10n injected, catalog only.
    Desktop,
}

impl Mode {
    /// Whether scripts get their runtime translations injected on read.
    pub fn injects_translations(self) -> bool {
        self != Mode::Development
    }

    /// Whether docs, the homepage, and the sitemap are part of the build.
    pub fn builds_website(self) -> bool {
        self != Mode::Desktop
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Development => "development",
            Mode::Production => "production",
            Mode::Desktop => "desktop",
        };
        f.write_str(name)
    }
}

/// Project configuration loaded from `gallery.toml`.
///
/// All fields have defaults matching the stock project layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Source roots, relative to the project root.
    pub paths: PathsConfig,
    /// Hosts used to build absolute URLs.
    pub hosts: HostsConfig,
    /// Allow-lists enforced by validation.
    pub rules: RulesConfig,
    /// Legacy virtual path → canonical virtual path.
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub extensions: PathBuf,
    /// Featured-slug list (JSON array, comments allowed).
    pub featured: PathBuf,
    pub images: PathBuf,
    pub samples: PathBuf,
    pub website: PathBuf,
    pub docs: PathBuf,
    pub translations: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            extensions: "extensions".into(),
            featured: "extensions/extensions.json".into(),
            images: "images".into(),
            samples: "samples".into(),
            website: "website".into(),
            docs: "docs".into(),
            translations: "translations".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostsConfig {
    /// Script host used in development mode.
    pub development: String,
    /// Script host used in production and desktop modes.
    pub production: String,
    /// Origin prefixed to every sitemap path (no trailing slash).
    pub sitemap: String,
    /// Editor URL that loads an extension or a sample project.
    pub editor: String,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            development: "http://localhost:8000/".into(),
            production: "https://scsupercraft.github.io/extensions/".into(),
            sitemap: "https://extensions.turbowarp.org".into(),
            editor: "https://turbowarp.org/editor".into(),
        }
    }
}

impl HostsConfig {
    /// The script host for a given mode.
    pub fn script_host(&self, mode: Mode) -> &str {
        match mode {
            Mode::Development => &self.development,
            Mode::Production | Mode::Desktop => &self.production,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Attribution links must start with this prefix.
    pub profile_link_prefix: String,
    /// Sample projects may only load scripts from these prefixes.
    pub sample_url_prefixes: Vec<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            profile_link_prefix: "https://scratch.mit.edu/users/".into(),
            sample_url_prefixes: vec![
                "https://scsupercraft.github.io/extensions/".into(),
                "https://extensions.turbowarp.org/extensions/".into(),
            ],
        }
    }
}

impl GalleryConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, host) in [
            ("hosts.development", &self.hosts.development),
            ("hosts.production", &self.hosts.production),
        ] {
            if !host.ends_with('/') {
                return Err(ConfigError::Validation(format!(
                    "{key} must end with '/': {host}"
                )));
            }
        }
        if self.hosts.sitemap.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "hosts.sitemap must not end with '/': {}",
                self.hosts.sitemap
            )));
        }
        if self.rules.sample_url_prefixes.is_empty() {
            return Err(ConfigError::Validation(
                "rules.sample_url_prefixes must not be empty".into(),
            ));
        }
        for (old, new) in &self.aliases {
            if !old.starts_with('/') || !new.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "aliases must be absolute virtual paths: {old} -> {new}"
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `gallery.toml` from the project root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config for a project root: stock defaults with the user file merged
/// on top, unknown keys rejected, values validated.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `gallery.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Extension Gallery Configuration
# ===============================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Source roots (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
extensions = "extensions"
# JSON array of featured slugs, in homepage order. Comments are allowed.
featured = "extensions/extensions.json"
images = "images"
samples = "samples"
website = "website"
docs = "docs"
translations = "translations"

# ---------------------------------------------------------------------------
# Hosts
# ---------------------------------------------------------------------------
[hosts]
# Where scripts are served from. Must end with '/'.
development = "http://localhost:8000/"
production = "https://scsupercraft.github.io/extensions/"
# Origin for sitemap entries. Must not end with '/'.
sitemap = "https://extensions.turbowarp.org"
# Editor that can load ?extension= and ?project_url=
editor = "https://turbowarp.org/editor"

# ---------------------------------------------------------------------------
# Validation rules
# ---------------------------------------------------------------------------
[rules]
# Attribution links ("// By: Name <link>") must start with this.
profile_link_prefix = "https://scratch.mit.edu/users/"
# Sample projects may only reference scripts under these prefixes.
sample_url_prefixes = [
    "https://scsupercraft.github.io/extensions/",
    "https://extensions.turbowarp.org/extensions/",
]

# ---------------------------------------------------------------------------
# Compatibility aliases: legacy path = canonical path
# ---------------------------------------------------------------------------
[aliases]
# "/old-name.js" = "/new-name.js"
"##
}
