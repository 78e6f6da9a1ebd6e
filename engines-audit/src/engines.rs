//! Engine entry parsing and matching.
//!
//! Pure functions over a parsed manifest: no I/O, no state, byte-identical
//! output for identical input. Entry order follows the manifest's own
//! insertion order.

use serde::Deserialize;
use serde_json::{Map, Value};

/// The subset of a `package.json` manifest this audit cares about.
///
/// An absent `engines` field and an empty one are equivalent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// Declared engine name to version-constraint mapping.
    #[serde(default)]
    pub engines: Map<String, Value>,
}

/// One declared engine and its version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEntry {
    /// Engine name, e.g. `node` or `npm`.
    pub name: String,

    /// Version constraint string, e.g. `~10.15.0`.
    pub version: String,
}

/// Parses manifest text into a [`PackageManifest`].
///
/// # Errors
///
/// Returns a parse error if the content is not valid JSON of the expected
/// shape.
pub fn parse_manifest(content: &str) -> Result<PackageManifest, serde_json::Error> {
    serde_json::from_str(content)
}

/// Returns the engine entries that satisfy `search_term`.
///
/// Without a term, every entry is returned in manifest order. With a term,
/// an entry is kept when its name **or** its version constraint contains the
/// term as a case-sensitive substring, so both `"node"` and `"6.8.0"` work as
/// search terms. Non-string constraint values are skipped.
pub fn match_engines(manifest: &PackageManifest, search_term: Option<&str>) -> Vec<EngineEntry> {
    manifest
        .engines
        .iter()
        .filter_map(|(name, value)| {
            let version = value.as_str()?;
            Some(EngineEntry {
                name: name.clone(),
                version: version.to_string(),
            })
        })
        .filter(|entry| match search_term {
            None => true,
            Some(term) => entry.name.contains(term) || entry.version.contains(term),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: serde_json::Value) -> PackageManifest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn no_term_returns_every_entry_in_order() {
        let manifest = manifest(json!({
            "engines": { "node": "~10.15.0", "npm": "6.8.0" }
        }));

        let entries = match_engines(&manifest, None);

        assert_eq!(
            entries,
            vec![
                EngineEntry {
                    name: "node".to_string(),
                    version: "~10.15.0".to_string()
                },
                EngineEntry {
                    name: "npm".to_string(),
                    version: "6.8.0".to_string()
                },
            ]
        );
    }

    #[test]
    fn term_matches_engine_name() {
        let manifest = manifest(json!({
            "engines": { "node": "~10.15.0", "npm": "6.8.0" }
        }));

        let entries = match_engines(&manifest, Some("node"));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "node");
    }

    #[test]
    fn term_matches_version_fragment() {
        let manifest = manifest(json!({
            "engines": { "node": "~10.15.0", "npm": "6.8.0" }
        }));

        let entries = match_engines(&manifest, Some("6.8.0"));

        assert_eq!(
            entries,
            vec![EngineEntry {
                name: "npm".to_string(),
                version: "6.8.0".to_string()
            }]
        );
    }

    #[test]
    fn term_without_any_match_returns_nothing() {
        let manifest = manifest(json!({
            "engines": { "node": "~10.15.0", "npm": "6.8.0" }
        }));

        assert!(match_engines(&manifest, Some("8.0.0")).is_empty());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let manifest = manifest(json!({
            "engines": { "node": "~10.15.0" }
        }));

        assert!(match_engines(&manifest, Some("Node")).is_empty());
    }

    #[test]
    fn absent_engines_yields_nothing() {
        let manifest = manifest(json!({ "name": "some-app" }));
        assert!(match_engines(&manifest, None).is_empty());
    }

    #[test]
    fn empty_engines_yields_nothing() {
        let manifest = manifest(json!({ "engines": {} }));
        assert!(match_engines(&manifest, None).is_empty());
    }

    #[test]
    fn non_string_constraints_are_skipped() {
        let manifest = manifest(json!({
            "engines": { "node": { "min": "10" }, "npm": "6.8.0" }
        }));

        let entries = match_engines(&manifest, None);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "npm");
    }

    #[test]
    fn parse_rejects_invalid_json() {
        assert!(parse_manifest("not a manifest").is_err());
    }
}
