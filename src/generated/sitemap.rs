//! `sitemap.xml` listing every HTML page of the finished build.

use crate::entity::{Entity, EntityError, EntityKind};
use crate::registry::Registry;

pub const SITEMAP_PATH: &str = "/sitemap.xml";

#[derive(Debug)]
pub struct Sitemap {
    /// Site origin without a trailing slash.
    host: String,
}

impl Sitemap {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Canonical page paths of `registry`, shortest first.
    ///
    /// Equal lengths keep registry order.
    pub fn page_paths(registry: &Registry) -> Vec<String> {
        let mut pages: Vec<String> = registry
            .paths()
            .filter(|p| p.ends_with(".html"))
            .map(|p| p.replacen("index.html", "", 1).replacen(".html", "", 1))
            .collect();
        pages.sort_by_key(String::len);
        pages
    }

    pub fn render(&self, registry: &Registry) -> String {
        let urls = Self::page_paths(registry)
            .iter()
            .map(|path| format!("<url><loc>{}</loc></url>", escape_xml(&format!("{}{path}", self.host))))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
             {urls}</urlset>\n"
        )
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl Entity for Sitemap {
    fn kind(&self) -> EntityKind {
        EntityKind::Generated
    }

    fn content_type(&self) -> String {
        ".xml".to_string()
    }

    fn read(&self, registry: &Registry) -> Result<Vec<u8>, EntityError> {
        Ok(self.render(registry).into_bytes())
    }
}
