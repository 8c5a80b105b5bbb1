//! Script header metadata.
//!
//! Every script starts with a block of `// Key: value` line comments:
//!
//! ```text
//! // Name: Fetch
//! // ID: fetch
//! // Description: Make requests to the broader internet.
//! // By: GarboMuffin <https://scratch.mit.edu/users/GarboMuffin/>
//! // Original: TheShovel
//! // License: MPL-2.0
//! // Context: Shown in the network category.
//! ```
//!
//! Parsing stops at the first line that is not a `//` comment. Keys are
//! case-insensitive; unknown keys are ignored; `By` and `Original` may repeat.
//! The parser never fails: missing fields are simply absent, and it is up to
//! validation to decide which ones are required.

use serde::Serialize;

/// A credited person: `Name` or `Name <link>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Parsed script header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionMetadata {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// SPDX license expression, unparsed.
    pub license: Option<String>,
    pub by: Vec<Person>,
    pub original: Vec<Person>,
    /// Extra hint for translators.
    pub context: Option<String>,
}

/// Parse the header comment block of a script.
pub fn parse_metadata(source: &str) -> ExtensionMetadata {
    let mut metadata = ExtensionMetadata::default();

    for line in source.lines() {
        let Some(comment) = line.strip_prefix("//") else {
            break;
        };
        let Some((key, value)) = comment.trim().split_once(':') else {
            continue;
        };
        let value = value.trim();
        let text = (!value.is_empty()).then(|| value.to_string());

        match key.trim().to_ascii_lowercase().as_str() {
            "id" => metadata.id = text,
            "name" => metadata.name = text,
            "description" => metadata.description = text,
            "license" => metadata.license = text,
            "context" => metadata.context = text,
            "by" => metadata.by.push(parse_person(value)),
            "original" => metadata.original.push(parse_person(value)),
            _ => {}
        }
    }

    metadata
}

/// Parse `Name <link>` into a [`Person`]. A missing or empty link is `None`.
fn parse_person(value: &str) -> Person {
    match value.split_once('<') {
        Some((name, rest)) => {
            let link = rest.trim_end().trim_end_matches('>').trim();
            Person {
                name: name.trim().to_string(),
                link: (!link.is_empty()).then(|| link.to_string()),
            }
        }
        None => Person {
            name: value.trim().to_string(),
            link: None,
        },
    }
}
