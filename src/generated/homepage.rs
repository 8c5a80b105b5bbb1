//! The gallery homepage (`/index.html`).

use super::{CrossRefs, UrlBuilder};
use crate::config::Mode;
use crate::entity::{Entity, EntityError, EntityKind};
use crate::metadata::{ExtensionMetadata, Person};
use crate::registry::Registry;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::rc::Rc;
use std::time::SystemTime;

pub const HOMEPAGE_PATH: &str = "/index.html";

/// How many scripts the "recently updated" list shows.
const RECENT_COUNT: usize = 5;

const CSS: &str = include_str!("../../static/homepage.css");

#[derive(Debug)]
pub struct Homepage {
    refs: Rc<CrossRefs>,
    urls: UrlBuilder,
    mode: Mode,
}

/// One featured script as shown on the homepage.
#[derive(Debug)]
struct FeaturedView {
    slug: String,
    metadata: ExtensionMetadata,
    image: Option<String>,
    has_docs: bool,
    samples: Vec<SampleLink>,
}

#[derive(Debug)]
struct SampleLink {
    title: String,
    url: String,
}

/// An entry of the "recently updated" list.
#[derive(Debug)]
struct RecentView {
    slug: String,
    name: String,
}

impl Homepage {
    pub fn new(refs: Rc<CrossRefs>, urls: UrlBuilder, mode: Mode) -> Self {
        Self { refs, urls, mode }
    }

    /// Slugs of the most recently modified scripts, newest first.
    fn recent(&self) -> Result<Vec<RecentView>, EntityError> {
        let mut dated: Vec<(SystemTime, &str)> = Vec::new();
        for (slug, script) in &self.refs.scripts {
            if let Some(modified) = script.last_modified()? {
                dated.push((modified, slug.as_str()));
            }
        }
        dated.sort_by(|a, b| b.0.cmp(&a.0));

        dated
            .into_iter()
            .take(RECENT_COUNT)
            .map(|(_, slug)| {
                let script = &self.refs.scripts[slug];
                let name = script.metadata()?.name.unwrap_or_else(|| slug.to_string());
                Ok(RecentView {
                    slug: slug.to_string(),
                    name,
                })
            })
            .collect()
    }

    fn featured(&self) -> Result<Vec<FeaturedView>, EntityError> {
        self.refs
            .featured
            .iter()
            .map(|slug| {
                let script = self.refs.featured_script(slug)?;
                let samples = self
                    .refs
                    .samples_for(slug)
                    .iter()
                    .map(|sample| SampleLink {
                        title: sample.title(),
                        url: self.urls.run_sample(&sample.slug()),
                    })
                    .collect();
                Ok(FeaturedView {
                    slug: slug.clone(),
                    metadata: script.metadata()?,
                    image: self.refs.images.get(slug).cloned(),
                    has_docs: self.refs.has_docs(slug),
                    samples,
                })
            })
            .collect()
    }

    fn render(&self, recent: &[RecentView], featured: &[FeaturedView]) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { "Extension Gallery" }
                    style { (PreEscaped(CSS)) }
                }
                body data-mode=(self.mode.to_string()) {
                    header.site-header {
                        h1 { "Extension Gallery" }
                    }
                    main {
                        @if !recent.is_empty() {
                            section.recent {
                                h2 { "Recently updated" }
                                ol {
                                    @for r in recent {
                                        li { a href={ "#" (r.slug) } { (r.name) } }
                                    }
                                }
                            }
                        }
                        div.extension-grid {
                            @for view in featured {
                                (self.render_extension(view))
                            }
                        }
                    }
                }
            }
        }
    }

    fn render_extension(&self, view: &FeaturedView) -> Markup {
        let name = view.metadata.name.as_deref().unwrap_or(&view.slug);
        html! {
            div.extension id=(view.slug) {
                @if let Some(image) = &view.image {
                    img src=(image) alt=(name) loading="lazy";
                }
                h3 { (name) }
                @if let Some(description) = &view.metadata.description {
                    p { (description) }
                }
                @if !view.metadata.by.is_empty() {
                    p.credits { "Created by " (people(&view.metadata.by)) }
                }
                @if !view.metadata.original.is_empty() {
                    p.credits { "Original by " (people(&view.metadata.original)) }
                }
                div.buttons {
                    a.copy href=(self.urls.full_script(&view.slug)) { "Copy URL" }
                    a.open href=(self.urls.run_script(&view.slug)) { "Open in editor" }
                    @if view.has_docs {
                        a.docs href=(self.urls.docs(&view.slug)) { "Documentation" }
                    }
                    @for sample in &view.samples {
                        a.sample href=(sample.url) { "Sample: " (sample.title) }
                    }
                }
            }
        }
    }
}

fn people(people: &[Person]) -> Markup {
    html! {
        @for (i, person) in people.iter().enumerate() {
            @if i > 0 { ", " }
            @match &person.link {
                Some(link) => {
                    a href=(link) { (person.name) }
                }
                None => {
                    (person.name)
                }
            }
        }
    }
}

impl Entity for Homepage {
    fn kind(&self) -> EntityKind {
        EntityKind::Generated
    }

    fn content_type(&self) -> String {
        ".html".to_string()
    }

    fn read(&self, _registry: &Registry) -> Result<Vec<u8>, EntityError> {
        let recent = self.recent()?;
        let featured = self.featured()?;
        Ok(self.render(&recent, &featured).into_string().into_bytes())
    }
}
