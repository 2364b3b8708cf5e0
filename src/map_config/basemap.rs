/// Basemaps every renderer can show without credentials.
pub const DEFAULT_BASEMAPS: &[&str] = &[
    "osm",
    "satellite",
    "hybrid",
    "gray",
    "dark-gray",
    "oceans",
    "terrain",
];

/// Resolve a requested basemap against `allowed`.
///
/// Returns the canonical (lowercase, trimmed) name when allowed, otherwise
/// `fallback`. The second element is `true` when the fallback was used.
pub fn resolve_basemap(requested: &str, allowed: &[String], fallback: &str) -> (String, bool) {
    let wanted = requested.trim().to_ascii_lowercase();
    if allowed.iter().any(|b| b.eq_ignore_ascii_case(&wanted)) {
        (wanted, false)
    } else {
        log::debug!("Basemap '{}' not allowed, using '{}'", requested, fallback);
        (fallback.to_string(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowlist() -> Vec<String> {
        DEFAULT_BASEMAPS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_basemaps_pass_through() {
        for name in DEFAULT_BASEMAPS {
            assert_eq!(resolve_basemap(name, &allowlist(), "osm"), (name.to_string(), false));
        }
    }

    #[test]
    fn case_and_whitespace_are_normalized() {
        assert_eq!(
            resolve_basemap("  Dark-Gray ", &allowlist(), "osm"),
            ("dark-gray".to_string(), false)
        );
    }

    #[test]
    fn unknown_basemap_falls_back() {
        assert_eq!(
            resolve_basemap("arcgis-imagery-premium", &allowlist(), "osm"),
            ("osm".to_string(), true)
        );
        assert_eq!(resolve_basemap("", &allowlist(), "osm"), ("osm".to_string(), true));
    }
}
