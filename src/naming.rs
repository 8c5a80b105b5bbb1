//! Filename conventions shared by every source root.
//!
//! A slug is the stable identifier tying a script to its image, docs page,
//! and samples. It is the relative file name up to the first `.`, so nested
//! scripts keep their directory:
//!
//! - `fetch.js` → `fetch`
//! - `Lily/TempVariables2.js` → `Lily/TempVariables2`
//! - `fetch.svg` → `fetch`
//! - `fetch.md` → `fetch`

/// Archive extensions recognized as sample projects.
pub const SAMPLE_EXTENSIONS: &[&str] = &[".sb3", ".pmp"];

/// Derive a slug from a relative file name.
pub fn slug_of(relative_name: &str) -> &str {
    relative_name
        .split_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(relative_name)
}

/// The extension of a file name including the dot (`".js"`), or `""`.
///
/// Only the final path component is considered, so directories containing
/// dots do not leak into the result.
pub fn extension_of(name: &str) -> &str {
    let file = name.rsplit('/').next().unwrap_or(name);
    match file.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &file[idx..],
    }
}

/// Whether a file name is a sample archive.
pub fn is_sample_archive(name: &str) -> bool {
    SAMPLE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Display title of a sample: its base name with archive extensions removed.
///
/// `Fetch Demo.sb3` → `Fetch Demo`
pub fn sample_title(base_name: &str) -> String {
    SAMPLE_EXTENSIONS
        .iter()
        .fold(base_name.to_string(), |title, ext| title.replacen(ext, "", 1))
}

/// Derive the slug a sample references from one of its script URLs.
///
/// When the URL lives under one of the allow-listed `prefixes`, the slug is
/// whatever follows the prefix; otherwise it is the URL path without its
/// leading `/`. The path is percent-decoded and the `.js` suffix dropped in
/// both cases. Returns `None` for URLs that cannot be parsed or decoded.
pub fn slug_from_script_url(url: &str, prefixes: &[String]) -> Option<String> {
    let path = match prefixes.iter().find_map(|p| url.strip_prefix(p.as_str())) {
        Some(rest) => rest.to_string(),
        None => {
            let parsed = url::Url::parse(url).ok()?;
            parsed.path().trim_start_matches('/').to_string()
        }
    };
    let path = urlencoding::decode(&path).ok()?;
    Some(path.strip_suffix(".js").unwrap_or(&path).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> Vec<String> {
        vec![
            "https://scsupercraft.github.io/extensions/".to_string(),
            "https://extensions.turbowarp.org/extensions/".to_string(),
        ]
    }

    #[test]
    fn slug_strips_everything_after_first_dot() {
        assert_eq!(slug_of("fetch.js"), "fetch");
        assert_eq!(slug_of("fetch.min.js"), "fetch");
        assert_eq!(slug_of("README"), "README");
    }

    #[test]
    fn slug_keeps_directories() {
        assert_eq!(slug_of("Lily/TempVariables2.js"), "Lily/TempVariables2");
    }

    #[test]
    fn extension_of_last_component() {
        assert_eq!(extension_of("fetch.js"), ".js");
        assert_eq!(extension_of("a.b/c.svg"), ".svg");
        assert_eq!(extension_of("a.b/Makefile"), "");
        assert_eq!(extension_of(".hidden"), "");
    }

    #[test]
    fn sample_archive_detection() {
        assert!(is_sample_archive("demo.sb3"));
        assert!(is_sample_archive("demo.pmp"));
        assert!(!is_sample_archive("demo.zip"));
    }

    #[test]
    fn sample_title_strips_archive_extension() {
        assert_eq!(sample_title("Fetch Demo.sb3"), "Fetch Demo");
        assert_eq!(sample_title("Penguin.pmp"), "Penguin");
        assert_eq!(sample_title("notes.txt"), "notes.txt");
    }

    #[test]
    fn slug_from_allow_listed_url() {
        assert_eq!(
            slug_from_script_url("https://extensions.turbowarp.org/extensions/fetch.js", &prefixes()),
            Some("fetch".to_string())
        );
        assert_eq!(
            slug_from_script_url(
                "https://scsupercraft.github.io/extensions/Lily/Cast.js",
                &prefixes()
            ),
            Some("Lily/Cast".to_string())
        );
    }

    #[test]
    fn slug_from_foreign_url_uses_path() {
        assert_eq!(
            slug_from_script_url("https://example.com/fetch.js", &prefixes()),
            Some("fetch".to_string())
        );
    }

    #[test]
    fn slug_from_url_is_percent_decoded() {
        assert_eq!(
            slug_from_script_url(
                "https://extensions.turbowarp.org/extensions/My%20Ext.js",
                &prefixes()
            ),
            Some("My Ext".to_string())
        );
        assert_eq!(
            slug_from_script_url("https://example.com/Lily/Caf%C3%A9.js", &prefixes()),
            Some("Lily/Café".to_string())
        );
    }

    #[test]
    fn slug_from_garbage_url_is_none() {
        assert_eq!(slug_from_script_url("not a url", &prefixes()), None);
    }
}
