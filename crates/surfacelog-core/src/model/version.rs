//! Version ordering.

use std::cmp::Ordering;

/// Parse a version string with `semver`, padding missing minor/patch
/// components (`"2"` and `"2.1"` are read as `2.0.0` and `2.1.0`).
pub fn parse_version(version: &str) -> Option<semver::Version> {
    let trimmed = version.trim().trim_start_matches('v');
    if let Ok(v) = semver::Version::parse(trimmed) {
        return Some(v);
    }
    let (core, rest) = match trimmed.find(|c: char| c == '-' || c == '+') {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };
    let padded = match core.split('.').count() {
        1 => format!("{}.0.0{}", core, rest),
        2 => format!("{}.0{}", core, rest),
        _ => return None,
    };
    semver::Version::parse(&padded).ok()
}

/// Order two version strings ascending.
///
/// Versions are compared by semver precedence. Unparsable versions sort
/// after every parsable one and compare as strings among themselves.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semver_precedence_not_lexical() {
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.0-beta", "1.0.0"), Ordering::Less);
    }

    #[test]
    fn test_short_versions_are_padded() {
        assert_eq!(compare_versions("2", "2.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("2.1", "2.0.5"), Ordering::Greater);
        assert_eq!(compare_versions("v3.0", "2.9.9"), Ordering::Greater);
    }

    #[test]
    fn test_unparsable_sorts_last() {
        assert_eq!(compare_versions("next", "99.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("alpha", "beta"), Ordering::Less);
    }
}
