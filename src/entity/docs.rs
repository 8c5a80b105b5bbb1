//! Documentation pages.
//!
//! Each `docs/{slug}.md` becomes `/{slug}.html`. Markdown is rendered with
//! pulldown-cmark and wrapped in a maud page. Fenced ```` ```scratch ````
//! blocks are left as `<code class="language-scratch">` and turned into
//! block diagrams in the browser by the support script served at
//! [`SUPPORT_SCRIPT_PATH`].

use super::{Entity, EntityError, EntityKind};
use crate::registry::Registry;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::fs;
use std::path::{Path, PathBuf};

/// Virtual path of the diagram support script.
pub const SUPPORT_SCRIPT_PATH: &str = "/docs-internal/scratchblocks.js";

/// Diagram support script, compiled in.
pub const SUPPORT_SCRIPT: &[u8] = include_bytes!("../../static/scratchblocks-loader.js");

const DOCS_CSS: &str = include_str!("../../static/docs.css");

#[derive(Debug, Clone)]
pub struct DocsFile {
    path: PathBuf,
    slug: String,
}

impl DocsFile {
    pub fn new(path: impl Into<PathBuf>, slug: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            slug: slug.into(),
        }
    }
}

impl Entity for DocsFile {
    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Docs
    }

    fn content_type(&self) -> String {
        ".html".to_string()
    }

    fn read(&self, _registry: &Registry) -> Result<Vec<u8>, EntityError> {
        let markdown = fs::read_to_string(&self.path)?;
        Ok(render_docs(&markdown, &self.slug).into_string().into_bytes())
    }
}

/// Render a documentation page for `slug`.
///
/// The page title is the first `# ` heading, or the slug when there is none.
pub fn render_docs(markdown: &str, slug: &str) -> Markup {
    let title = markdown
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|| slug.to_string());

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Extension Documentation" }
                style { (PreEscaped(DOCS_CSS)) }
            }
            body data-extension=(slug) {
                header.docs-header {
                    a href="/" { "Back to gallery" }
                }
                main.docs-content {
                    (PreEscaped(body_html))
                }
                script src=(SUPPORT_SCRIPT_PATH) {}
            }
        }
    }
}
