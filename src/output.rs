//! CLI output formatting.
//!
//! Each command has a `format_*` function returning display lines, and a
//! `print_*` wrapper writing them to stdout. Format functions are pure so
//! the exact output can be tested.
//!
//! ## Build
//!
//! ```text
//! Scripts
//! 001 /fetch.js
//! 002 /Lily/Cast.js
//!
//! Images
//! 001 /images/fetch.svg
//!
//! Generated
//! 001 /index.html
//! 002 /sitemap.xml
//!
//! Aliases
//!     /legacy.js
//!
//! Exported 5 files to build
//! ```
//!
//! ## Validate
//!
//! ```text
//! /images/bad.png
//!     Aspect ratio must be exactly 2, but found 1.9950 (800x401)
//!
//! 1 of 12 files failed validation
//! ```

use crate::entity::EntityKind;
use crate::l10n::MergedStrings;
use crate::registry::Registry;
use crate::validate::ValidationFailure;
use std::path::{Path, PathBuf};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn section_title(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Script => "Scripts",
        EntityKind::Image => "Images",
        EntityKind::Sample => "Samples",
        EntityKind::Docs => "Documentation",
        EntityKind::Generated => "Generated",
        EntityKind::Plain => "Website",
    }
}

const SECTIONS: [EntityKind; 6] = [
    EntityKind::Script,
    EntityKind::Image,
    EntityKind::Sample,
    EntityKind::Docs,
    EntityKind::Plain,
    EntityKind::Generated,
];

// ============================================================================
// Build
// ============================================================================

/// Inventory of a build, grouped by entity kind, followed by its aliases.
pub fn format_build_output(registry: &Registry, output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for kind in SECTIONS {
        let paths: Vec<&str> = registry
            .entries()
            .filter(|(_, e)| e.kind() == kind)
            .map(|(p, _)| p)
            .collect();
        if paths.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(section_title(kind).to_string());
        for (i, path) in paths.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), path));
        }
    }

    let aliases: Vec<&str> = registry.alias_paths().collect();
    if !aliases.is_empty() {
        lines.push(String::new());
        lines.push("Aliases".to_string());
        for alias in aliases {
            lines.push(format!("{}{}", indent(1), alias));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let total = registry.len() + registry.alias_count();
    lines.push(format!(
        "Exported {} {} to {}",
        total,
        if total == 1 { "file" } else { "files" },
        output_dir.display()
    ));
    lines
}

pub fn print_build_output(registry: &Registry, output_dir: &Path) {
    for line in format_build_output(registry, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Validate
// ============================================================================

/// Every failure with its message, then a summary over `checked` entities.
pub fn format_validation_output(failures: &[ValidationFailure], checked: usize) -> Vec<String> {
    if failures.is_empty() {
        return vec![format!("All {} files passed validation", checked)];
    }

    let mut lines = Vec::new();
    for failure in failures {
        lines.push(failure.path.clone());
        for message_line in failure.error.to_string().lines() {
            lines.push(format!("{}{}", indent(1), message_line));
        }
        lines.push(String::new());
    }
    lines.push(format!(
        "{} of {} files failed validation",
        failures.len(),
        checked
    ));
    lines
}

pub fn print_validation_output(failures: &[ValidationFailure], checked: usize) {
    for line in format_validation_output(failures, checked) {
        println!("{}", line);
    }
}

// ============================================================================
// Localization export
// ============================================================================

/// One line per exported group.
pub fn format_l10n_output(merged: &MergedStrings, written: &[PathBuf]) -> Vec<String> {
    let mut lines: Vec<String> = merged
        .groups()
        .zip(written)
        .map(|((group, strings), path)| {
            format!(
                "{} ({} strings) → {}",
                group,
                strings.len(),
                path.display()
            )
        })
        .collect();
    lines.push(format!(
        "Exported {} strings in {} groups",
        merged.len(),
        written.len()
    ));
    lines
}

pub fn print_l10n_output(merged: &MergedStrings, written: &[PathBuf]) {
    for line in format_l10n_output(merged, written) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EmbeddedFile, Entity, EntityError};
    use std::rc::Rc;

    struct Kind(EntityKind);

    impl Entity for Kind {
        fn kind(&self) -> EntityKind {
            self.0
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn build_output_groups_by_kind() {
        let mut registry = Registry::new();
        registry.put("/index.html", Rc::new(Kind(EntityKind::Generated)));
        registry.put("/fetch.js", Rc::new(Kind(EntityKind::Script)));
        registry.put("/cast.js", Rc::new(Kind(EntityKind::Script)));
        registry.alias("/legacy.js", "/fetch.js").unwrap();

        let lines = format_build_output(&registry, Path::new("build"));
        assert_eq!(
            lines,
            vec![
                "Scripts",
                "001 /fetch.js",
                "002 /cast.js",
                "",
                "Generated",
                "001 /index.html",
                "",
                "Aliases",
                "    /legacy.js",
                "",
                "Exported 4 files to build",
            ]
        );
    }

    #[test]
    fn empty_build_output() {
        let lines = format_build_output(&Registry::new(), Path::new("out"));
        assert_eq!(lines, vec!["Exported 0 files to out"]);
    }

    #[test]
    fn validation_success() {
        assert_eq!(
            format_validation_output(&[], 7),
            vec!["All 7 files passed validation"]
        );
    }

    #[test]
    fn validation_failures_listed() {
        let failures = vec![ValidationFailure {
            path: "/images/bad.png".into(),
            error: EntityError::Invalid("Aspect ratio must be exactly 2".into()),
        }];
        assert_eq!(
            format_validation_output(&failures, 3),
            vec![
                "/images/bad.png",
                "    Aspect ratio must be exactly 2",
                "",
                "1 of 3 files failed validation",
            ]
        );
    }

    #[test]
    fn l10n_output_lists_groups() {
        let mut registry = Registry::new();
        registry.put("/x.js", Rc::new(EmbeddedFile::new(".js", b"")));
        let merged = crate::l10n::generate(&registry).unwrap();
        let lines = format_l10n_output(&merged, &[]);
        assert_eq!(lines, vec!["Exported 0 strings in 0 groups"]);
    }
}
