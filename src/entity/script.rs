//! Extension scripts.
//!
//! A script is served at `/{relative name}`. Featured scripts (those listed in
//! the featured file) are held to stricter rules: their header metadata must
//! be complete, and their strings are offered to translators.
//!
//! Outside development mode, reading a script injects the runtime
//! translations for its slug right after the header comments, so the script
//! works in every locale without fetching anything.

use super::{Entity, EntityError, EntityKind};
use crate::config::{Mode, RulesConfig};
use crate::metadata::{self, ExtensionMetadata};
use crate::registry::Registry;
use crate::translations::{
    self, EntityStrings, LocaleCatalog, METADATA_GROUP, RUNTIME_GROUP, TranslatableString,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Description must end with one of these.
const TERMINAL_PUNCTUATION: &[char] = &['.', '!', '?'];

const L10N_START: &str = "/* generated l10n code */";
const L10N_END: &str = "/* end generated l10n code */";

#[derive(Debug, Clone)]
pub struct ScriptFile {
    path: PathBuf,
    slug: String,
    featured: bool,
    runtime_translations: Rc<LocaleCatalog>,
    rules: Rc<RulesConfig>,
    mode: Mode,
}

impl ScriptFile {
    pub fn new(
        path: impl Into<PathBuf>,
        slug: impl Into<String>,
        featured: bool,
        runtime_translations: Rc<LocaleCatalog>,
        rules: Rc<RulesConfig>,
        mode: Mode,
    ) -> Self {
        Self {
            path: path.into(),
            slug: slug.into(),
            featured,
            runtime_translations,
            rules,
            mode,
        }
    }

    /// Parse the header comments of the script.
    pub fn metadata(&self) -> Result<ExtensionMetadata, EntityError> {
        let source = fs::read_to_string(&self.path)?;
        Ok(metadata::parse_metadata(&source))
    }

    fn key(&self, suffix: &str) -> String {
        format!("{}@{}", self.slug, suffix)
    }
}

impl Entity for ScriptFile {
    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Script
    }

    fn read(&self, _registry: &Registry) -> Result<Vec<u8>, EntityError> {
        let source = fs::read_to_string(&self.path)?;
        if !self.mode.injects_translations() {
            return Ok(source.into_bytes());
        }

        let prefix = self.key("");
        match translations::filter_by_prefix(&self.runtime_translations, &prefix) {
            Some(strings) => {
                let setup = format!(
                    "{L10N_START}Scratch.translate.setup({});{L10N_END}",
                    serde_json::to_string(&strings)?
                );
                Ok(insert_after_header(&source, &setup)?.into_bytes())
            }
            None => Ok(source.into_bytes()),
        }
    }

    fn validate(&self) -> Result<(), EntityError> {
        if !self.featured {
            return Ok(());
        }

        let metadata = self.metadata()?;

        if metadata.id.is_none() {
            return Err(EntityError::invalid("Missing // ID:"));
        }
        if metadata.name.is_none() {
            return Err(EntityError::invalid("Missing // Name:"));
        }
        let Some(description) = metadata.description.as_deref() else {
            return Err(EntityError::invalid("Missing // Description:"));
        };
        if !description.ends_with(TERMINAL_PUNCTUATION) {
            return Err(EntityError::invalid(format!(
                "Description is missing punctuation: {description}"
            )));
        }

        let Some(license) = metadata.license.as_deref() else {
            return Err(EntityError::invalid(
                "Missing // License: -- We recommend using // License: MPL-2.0",
            ));
        };
        if spdx::Expression::parse(license).is_err() {
            return Err(EntityError::invalid(format!(
                "{license} is not a valid SPDX license. Did you typo it? It is case sensitive. \
                 We recommend using // License: MPL-2.0"
            )));
        }

        for person in metadata.by.iter().chain(&metadata.original) {
            if person.name.is_empty() {
                return Err(EntityError::invalid("Person is missing name"));
            }
            if let Some(link) = &person.link
                && !link.starts_with(&self.rules.profile_link_prefix)
            {
                return Err(EntityError::invalid(format!(
                    "Link for {} does not point to a user profile ({})",
                    person.name, self.rules.profile_link_prefix
                )));
            }
        }

        Ok(())
    }

    fn strings(&self) -> Result<Option<EntityStrings>, EntityError> {
        if !self.featured {
            return Ok(None);
        }

        let source = fs::read_to_string(&self.path)?;
        let metadata = metadata::parse_metadata(&source);
        let name = metadata.name.clone().unwrap_or_default();
        let developer_comment = |part: &str| {
            let mut comment =
                format!("{part} of the '{name}' extension in the extension gallery.");
            if let Some(context) = &metadata.context {
                comment.push(' ');
                comment.push_str(context);
            }
            Some(comment)
        };

        let mut metadata_strings = BTreeMap::new();
        if let Some(name) = &metadata.name {
            metadata_strings.insert(
                self.key("name"),
                TranslatableString {
                    string: name.clone(),
                    developer_comment: developer_comment("Name"),
                },
            );
        }
        if let Some(description) = &metadata.description {
            metadata_strings.insert(
                self.key("description"),
                TranslatableString {
                    string: description.clone(),
                    developer_comment: developer_comment("Description"),
                },
            );
        }

        let runtime_strings = translations::extract_runtime_strings(&source)
            .map_err(EntityError::Strings)?
            .into_iter()
            .map(|(key, value)| (self.key(&key), value))
            .collect();

        let mut strings = EntityStrings::new();
        strings.insert(METADATA_GROUP.to_string(), metadata_strings);
        strings.insert(RUNTIME_GROUP.to_string(), runtime_strings);
        Ok(Some(strings))
    }
}

/// Insert `insert` after the leading comments and whitespace of `code`.
///
/// Skips any run of `//` line comments, `/* */` block comments and
/// whitespace, so license headers and metadata stay on top.
pub fn insert_after_header(code: &str, insert: &str) -> Result<String, EntityError> {
    let mut index = 0;
    loop {
        let rest = &code[index..];
        if rest.starts_with("//") {
            match rest.find('\n') {
                Some(end) => index += end,
                None => {
                    index = code.len();
                    break;
                }
            }
        } else if rest.starts_with("/*") {
            match rest.find("*/") {
                Some(end) => index += end + 2,
                None => return Err(EntityError::invalid("Block comment never ends")),
            }
        } else if let Some(c) = rest.chars().next().filter(|c| c.is_whitespace()) {
            index += c.len_utf8();
        } else {
            break;
        }
    }

    let mut result = String::with_capacity(code.len() + insert.len());
    result.push_str(&code[..index]);
    result.push_str(insert);
    result.push_str(&code[index..]);
    Ok(result)
}
