//! Rebuild on change.
//!
//! Every filesystem event under a source root triggers a complete rebuild.
//! A failed build is logged and handed to the callback as `None`; the loop
//! keeps waiting for the next change either way.

use crate::builder::Builder;
use crate::registry::Registry;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::sync::mpsc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Build once, then rebuild on every change until the watcher goes away.
pub fn watch(builder: &Builder, callback: impl FnMut(Option<Registry>)) -> Result<(), WatchError> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    for root in builder.watch_roots() {
        if root.exists() {
            watcher.watch(&root, RecursiveMode::Recursive)?;
            tracing::info!(root = %root.display(), "Watching");
        }
    }
    run_loop(builder, rx, callback);
    Ok(())
}

/// Drive rebuilds from a stream of events.
///
/// Runs one build up front, then one per relevant event. Returns when
/// `events` is exhausted.
pub fn run_loop(
    builder: &Builder,
    events: impl IntoIterator<Item = notify::Result<Event>>,
    mut callback: impl FnMut(Option<Registry>),
) {
    callback(builder.try_build());

    for event in events {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Watch error");
                continue;
            }
        };
        if !triggers_rebuild(&event.kind) {
            continue;
        }
        for path in &event.paths {
            tracing::info!(path = %path.display(), kind = ?event.kind, "File change detected");
        }
        callback(builder.try_build());
    }
}

fn triggers_rebuild(kind: &EventKind) -> bool {
    !matches!(kind, EventKind::Access(_))
}
