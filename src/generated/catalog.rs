//! Machine-readable catalog of featured scripts.
//!
//! Served at [`CATALOG_PATH`] for editors and other tools that list the
//! gallery's contents. Always part of the build, desktop mode included.

use super::CrossRefs;
use crate::entity::{Entity, EntityError, EntityKind};
use crate::metadata::Person;
use crate::registry::Registry;
use crate::translations;
use serde::Serialize;
use std::collections::BTreeMap;
use std::rc::Rc;

pub const CATALOG_PATH: &str = "/generated-metadata/extensions-v0.json";

#[derive(Debug)]
pub struct Catalog {
    refs: Rc<CrossRefs>,
}

#[derive(Debug, Serialize)]
pub struct CatalogDocument {
    pub extensions: Vec<CatalogEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub slug: String,
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_translations: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_translations: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub by: Vec<Person>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub original: Vec<Person>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub docs: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<String>,
}

impl Catalog {
    pub fn new(refs: Rc<CrossRefs>) -> Self {
        Self { refs }
    }

    pub fn document(&self) -> Result<CatalogDocument, EntityError> {
        let refs = &self.refs;
        let extensions = refs
            .featured
            .iter()
            .map(|slug| {
                let metadata = refs.featured_script(slug)?.metadata()?;
                Ok(CatalogEntry {
                    slug: slug.clone(),
                    id: metadata.id.unwrap_or_default(),
                    name: metadata.name.unwrap_or_default(),
                    description: metadata.description.unwrap_or_default(),
                    name_translations: translations::filter_by_id(
                        &refs.metadata_translations,
                        &format!("{slug}@name"),
                    ),
                    description_translations: translations::filter_by_id(
                        &refs.metadata_translations,
                        &format!("{slug}@description"),
                    ),
                    image: refs.images.get(slug).cloned(),
                    by: metadata.by,
                    original: metadata.original,
                    docs: refs.has_docs(slug),
                    samples: refs.samples_for(slug).iter().map(|s| s.title()).collect(),
                })
            })
            .collect::<Result<_, EntityError>>()?;
        Ok(CatalogDocument { extensions })
    }
}

impl Entity for Catalog {
    fn kind(&self) -> EntityKind {
        EntityKind::Generated
    }

    fn content_type(&self) -> String {
        ".json".to_string()
    }

    fn read(&self, _registry: &Registry) -> Result<Vec<u8>, EntityError> {
        Ok(serde_json::to_vec(&self.document()?)?)
    }
}
