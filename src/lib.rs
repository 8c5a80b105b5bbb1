//! # Extension Gallery
//!
//! Builds the extension gallery website from a checkout of its sources:
//! extension scripts, banner images, sample projects, documentation, and
//! translation catalogs.
//!
//! # Architecture: Assemble, Then Materialize
//!
//! Every build runs in two phases:
//!
//! ```text
//! 1. Assemble      sources  →  Registry      (scan roots, classify, cross-reference)
//! 2. Materialize   Registry →  build/        (read every entity, write it out)
//!                  Registry →  failures      (validate)
//!                  Registry →  l10n/         (merge translatable strings)
//! ```
//!
//! The [`registry::Registry`] maps each virtual output path (`/fetch.js`,
//! `/images/fetch.svg`, `/index.html`) to an [`entity::Entity`]. Entities
//! read lazily: the homepage, catalog and sitemap compute their content from
//! the finished registry when they are read, so the order in which the
//! builder inserts them does not matter.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`builder`] | Scans the source roots into a registry; `build`, `try_build`, `validate` |
//! | [`registry`] | Ordered virtual path → entity map with aliases and export |
//! | [`entity`] | The entity trait and its file variants (script, image, sample, docs, plain) |
//! | [`generated`] | Derived entities: homepage, catalog, sitemap |
//! | [`validate`] | Failure-collecting validation pass |
//! | [`l10n`] | Merges every entity's translatable strings, exports one file per group |
//! | [`watch`] | Rebuilds on filesystem changes |
//! | [`config`] | `gallery.toml` loading, stock defaults, build [`config::Mode`] |
//! | [`translations`] | Translation catalogs and their filters |
//! | [`metadata`] | `// Key: value` script header parser |
//! | [`naming`] | Slugs and titles from file names and URLs |
//! | [`walk`] | Recursive source-root walker |
//! | [`archive`] | Reads the manifest out of sample archives |
//! | [`output`] | CLI output formatting |
//!
//! # Modes
//!
//! | Mode | Translations injected | Script host | Homepage, docs, sitemap |
//! |------|-----------------------|-------------|-------------------------|
//! | development | no | `http://localhost:8000/` | yes |
//! | production | yes | public host | yes |
//! | desktop | yes | public host | no (catalog only) |
//!
//! The mode is passed to [`builder::Builder::new`]; nothing reads it from the
//! environment.
//!
//! # Single-Threaded
//!
//! A build is one synchronous pass. Entities share indices through `Rc`, and
//! each build owns its registry outright; the watch loop discards the previous
//! registry before building the next.

pub mod archive;
pub mod builder;
pub mod config;
pub mod entity;
pub mod generated;
pub mod l10n;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod registry;
pub mod translations;
pub mod validate;
pub mod walk;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
