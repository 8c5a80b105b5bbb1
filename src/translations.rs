//! Translation catalogs.
//!
//! Catalogs live in the translations root as `<group>.json`, each holding
//! `locale -> key -> string`. Script-derived keys are `"{slug}@{suffix}"`, so
//! one catalog covers every script and per-script views are cut out with
//! [`filter_by_prefix`] and [`filter_by_id`].
//!
//! This module also extracts the *source* strings a script wants translated
//! (the other direction: script → translators), see
//! [`extract_runtime_strings`].

use crate::naming;
use crate::walk;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Group holding script names and descriptions shown in the gallery.
pub const METADATA_GROUP: &str = "extension-metadata";
/// Group holding strings the scripts show at runtime.
pub const RUNTIME_GROUP: &str = "extension-runtime";

/// `key -> string` for one locale.
pub type LocaleStrings = BTreeMap<String, String>;
/// `locale -> key -> string`.
pub type LocaleCatalog = BTreeMap<String, LocaleStrings>;

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid translation file {file}: {source}")]
    Json {
        file: String,
        source: serde_json::Error,
    },
}

/// All input catalogs, keyed by group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translations {
    groups: BTreeMap<String, LocaleCatalog>,
}

impl Translations {
    /// The catalog for `group`, or an empty one.
    pub fn group(&self, group: &str) -> LocaleCatalog {
        self.groups.get(group).cloned().unwrap_or_default()
    }

    pub fn insert(&mut self, group: impl Into<String>, catalog: LocaleCatalog) {
        self.groups.insert(group.into(), catalog);
    }
}

/// Load every `*.json` catalog under `root`.
///
/// The group name is the file name up to its first `.`
/// (`extension-runtime.json` → `extension-runtime`).
pub fn load_translations(root: &Path) -> Result<Translations, TranslationError> {
    let mut translations = Translations::default();
    for entry in walk::walk_files(root)? {
        if !entry.name.ends_with(".json") {
            continue;
        }
        let group = naming::slug_of(&entry.name).to_string();
        let content = fs::read_to_string(&entry.path)?;
        let catalog: LocaleCatalog =
            serde_json::from_str(&content).map_err(|source| TranslationError::Json {
                file: entry.name.clone(),
                source,
            })?;
        tracing::debug!(group = %group, locales = catalog.len(), "loaded translations");
        translations.insert(group, catalog);
    }
    Ok(translations)
}

/// Every locale's keys starting with `prefix`, with the prefix removed.
///
/// Locales with no matching key are left out; `None` when no locale matches.
pub fn filter_by_prefix(catalog: &LocaleCatalog, prefix: &str) -> Option<LocaleCatalog> {
    let filtered: LocaleCatalog = catalog
        .iter()
        .filter_map(|(locale, strings)| {
            let matching: LocaleStrings = strings
                .iter()
                .filter_map(|(key, value)| {
                    key.strip_prefix(prefix)
                        .map(|rest| (rest.to_string(), value.clone()))
                })
                .collect();
            (!matching.is_empty()).then(|| (locale.clone(), matching))
        })
        .collect();
    (!filtered.is_empty()).then_some(filtered)
}

/// The string stored at exactly `key`, per locale.
///
/// Empty strings count as untranslated. `None` when no locale has the key.
pub fn filter_by_id(catalog: &LocaleCatalog, key: &str) -> Option<BTreeMap<String, String>> {
    let found: BTreeMap<String, String> = catalog
        .iter()
        .filter_map(|(locale, strings)| {
            strings
                .get(key)
                .filter(|s| !s.is_empty())
                .map(|s| (locale.clone(), s.clone()))
        })
        .collect();
    (!found.is_empty()).then_some(found)
}

// ============================================================================
// Source strings
// ============================================================================

/// One string offered to translators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatableString {
    /// English source text.
    pub string: String,
    /// Context for translators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_comment: Option<String>,
}

/// `group -> key -> string` contributed by one entity.
pub type EntityStrings = BTreeMap<String, BTreeMap<String, TranslatableString>>;

static TRANSLATE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"Scratch\s*\.\s*translate\s*\(\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)'|\{([^}]*)\})"#,
    )
    .expect("translate call pattern is valid")
});

static OBJECT_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)\s*:\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#)
        .expect("object property pattern is valid")
});

/// Find every `Scratch.translate(...)` call in a script.
///
/// Two call shapes are understood:
///
/// - `Scratch.translate("Hello")`: the text is both key and source string.
/// - `Scratch.translate({ id: "hello", default: "Hello", description: "..." })`:
///   `default` is required, `id` falls back to `default`, `description`
///   becomes the developer comment.
///
/// Returns unprefixed keys. Using one key for two different strings is an
/// error.
pub fn extract_runtime_strings(
    source: &str,
) -> Result<BTreeMap<String, TranslatableString>, String> {
    let mut strings = BTreeMap::new();

    for caps in TRANSLATE_CALL.captures_iter(source) {
        let (key, value) = if let Some(text) = caps.get(1).or_else(|| caps.get(2)) {
            let text = unescape_js(text.as_str());
            (
                text.clone(),
                TranslatableString {
                    string: text,
                    developer_comment: None,
                },
            )
        } else if let Some(body) = caps.get(3) {
            let props = parse_object_literal(body.as_str());
            let default = props.get("default").cloned().ok_or_else(|| {
                format!("Scratch.translate() object is missing default: {{{}}}", body.as_str())
            })?;
            let id = props.get("id").cloned().unwrap_or_else(|| default.clone());
            (
                id,
                TranslatableString {
                    string: default,
                    developer_comment: props.get("description").cloned(),
                },
            )
        } else {
            continue;
        };

        if let Some(existing) = strings.get(&key)
            && existing != &value
        {
            return Err(format!(
                "Scratch.translate() id {key:?} is used for different strings"
            ));
        }
        strings.insert(key, value);
    }

    Ok(strings)
}

fn parse_object_literal(body: &str) -> BTreeMap<String, String> {
    OBJECT_PROPERTY
        .captures_iter(body)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_string();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some((key, unescape_js(value)))
        })
        .collect()
}

/// Resolve the escapes that show up in quoted script strings.
fn unescape_js(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn catalog(entries: &[(&str, &[(&str, &str)])]) -> LocaleCatalog {
        entries
            .iter()
            .map(|(locale, strings)| {
                (
                    locale.to_string(),
                    strings
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn filter_by_id_finds_single_locale() {
        let c = catalog(&[("en", &[("x", "hi")]), ("fr", &[])]);
        let result = filter_by_id(&c, "x").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result["en"], "hi");
    }

    #[test]
    fn filter_by_id_missing_everywhere_is_none() {
        let c = catalog(&[("en", &[("x", "hi")]), ("fr", &[])]);
        assert_eq!(filter_by_id(&c, "y"), None);
    }

    #[test]
    fn filter_by_id_skips_empty_strings() {
        let c = catalog(&[("de", &[("x", "")])]);
        assert_eq!(filter_by_id(&c, "x"), None);
    }

    #[test]
    fn filter_by_prefix_strips_prefix() {
        let c = catalog(&[
            ("de", &[("fetch@Hello", "Hallo"), ("other@Hello", "Nein")]),
            ("fr", &[("other@Hello", "Non")]),
        ]);
        let result = filter_by_prefix(&c, "fetch@").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result["de"]["Hello"], "Hallo");
        assert!(!result.contains_key("fr"));
    }

    #[test]
    fn filter_by_prefix_no_match_is_none() {
        let c = catalog(&[("de", &[("other@Hello", "Nein")])]);
        assert_eq!(filter_by_prefix(&c, "fetch@"), None);
    }

    #[test]
    fn load_translations_groups_by_file_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("extension-runtime.json"),
            r#"{"de": {"fetch@Hello": "Hallo"}}"#,
        )
        .unwrap();
        fs::write(tmp.path().join("README.md"), "ignored").unwrap();

        let t = load_translations(tmp.path()).unwrap();
        assert!(t.group("README").is_empty());
        assert_eq!(t.group(RUNTIME_GROUP)["de"]["fetch@Hello"], "Hallo");
        assert!(t.group(METADATA_GROUP).is_empty());
    }

    #[test]
    fn load_translations_reports_bad_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("broken.json"), "{").unwrap();
        let result = load_translations(tmp.path());
        assert!(matches!(result, Err(TranslationError::Json { .. })));
    }

    #[test]
    fn extract_plain_string_calls() {
        let src = r#"text: Scratch.translate("Hello"), other: Scratch.translate('It\'s')"#;
        let strings = extract_runtime_strings(src).unwrap();
        assert_eq!(strings["Hello"].string, "Hello");
        assert_eq!(strings["It's"].string, "It's");
        assert_eq!(strings["Hello"].developer_comment, None);
    }

    #[test]
    fn extract_object_calls() {
        let src = r#"Scratch.translate({ id: "greet", default: "Hello [NAME]", description: "Block text" })"#;
        let strings = extract_runtime_strings(src).unwrap();
        let s = &strings["greet"];
        assert_eq!(s.string, "Hello [NAME]");
        assert_eq!(s.developer_comment.as_deref(), Some("Block text"));
    }

    #[test]
    fn object_without_id_uses_default() {
        let strings = extract_runtime_strings(r#"Scratch.translate({default: "Go"})"#).unwrap();
        assert!(strings.contains_key("Go"));
    }

    #[test]
    fn object_without_default_is_error() {
        assert!(extract_runtime_strings(r#"Scratch.translate({id: "x"})"#).is_err());
    }

    #[test]
    fn conflicting_ids_are_error() {
        let src = r#"Scratch.translate({id: "x", default: "A"}); Scratch.translate({id: "x", default: "B"})"#;
        assert!(extract_runtime_strings(src).is_err());
    }

    #[test]
    fn setup_call_is_not_a_string() {
        let strings = extract_runtime_strings("Scratch.translate.setup({});").unwrap();
        assert!(strings.is_empty());
    }

    #[test]
    fn unescape_handles_common_escapes() {
        assert_eq!(unescape_js(r"a\nb"), "a\nb");
        assert_eq!(unescape_js(r"\u00e9"), "é");
        assert_eq!(unescape_js(r#"say \"hi\""#), "say \"hi\"");
    }
}
