//! Manifest version rewriting.
//!
//! The manifest is treated as text: only the value of the first
//! `"version": "..."` field changes, every other byte is kept as is.

use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

static VERSION_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"("version"\s*:\s*")([^"]*)(")"#).expect("version field regex is valid")
});

/// Replace the value of the first `"version"` field with `new_version`
///
/// A manifest without the field is returned unchanged.
pub fn patch_version(manifest: &str, new_version: &Version) -> String {
    VERSION_FIELD_RE
        .replace(manifest, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], new_version, &caps[3])
        })
        .into_owned()
}

/// Value of the first `"version"` field, if present
pub fn current_version(manifest: &str) -> Option<&str> {
    VERSION_FIELD_RE
        .captures(manifest)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKAGE_JSON: &str = "{\n  \"name\": \"@acme/core\",\n  \"version\" :  \"0.3.1\",\n  \"dependencies\": {\n    \"grid\": \"^1.0.0\"\n  },\n  \"private\": true\n}\n";

    #[test]
    fn test_patch_replaces_only_the_value() {
        let patched = patch_version(PACKAGE_JSON, &Version::new(0, 4, 0));
        assert_eq!(
            patched,
            PACKAGE_JSON.replace("\"version\" :  \"0.3.1\"", "\"version\" :  \"0.4.0\"")
        );
        assert_eq!(current_version(&patched), Some("0.4.0"));
    }

    #[test]
    fn test_patch_twice_keeps_other_bytes() {
        let once = patch_version(PACKAGE_JSON, &Version::new(1, 0, 0));
        let twice = patch_version(&once, &Version::new(2, 5, 1));

        assert_eq!(current_version(&twice), Some("2.5.1"));
        assert_eq!(
            twice.replace("2.5.1", "0.3.1"),
            PACKAGE_JSON,
            "only the version value may differ from the original"
        );
    }

    #[test]
    fn test_only_first_field_is_patched() {
        let text = r#"{"version": "1.0.0", "engines": {"version": "9.9.9"}}"#;
        let patched = patch_version(text, &Version::new(1, 0, 1));
        assert_eq!(
            patched,
            r#"{"version": "1.0.1", "engines": {"version": "9.9.9"}}"#
        );
    }

    #[test]
    fn test_missing_field_is_not_an_error() {
        let text = "{\n  \"name\": \"core\"\n}\n";
        assert_eq!(patch_version(text, &Version::new(1, 0, 0)), text);
        assert_eq!(current_version(text), None);
    }
}
