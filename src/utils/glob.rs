//! Glob compilation with path-aware `*` semantics.
//!
//! Patterns come from user config (`route.source_path`, `exclude`) and
//! follow the common convention that `*` never crosses a `/` while `**`
//! spans any number of directories.

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};

/// Compile a single pattern into a matcher.
///
/// `*` stays within one path segment; `**` crosses segments.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// Compile a list of patterns into one set.
///
/// An empty list yields a set that matches nothing.
pub fn build_glob_set(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_stays_in_segment() {
        let m = compile_glob("Logs/*.md").unwrap();
        assert!(m.is_match("Logs/daily.md"));
        assert!(!m.is_match("Logs/2024/daily.md"));
    }

    #[test]
    fn test_double_star_spans_segments() {
        let m = compile_glob("Logs/**/*.md").unwrap();
        assert!(m.is_match("Logs/daily.md"));
        assert!(m.is_match("Logs/2024/01/daily.md"));
        assert!(!m.is_match("Notes/daily.md"));
    }

    #[test]
    fn test_glob_set() {
        let set =
            build_glob_set(&["Templates/**".to_string(), "**/*.draft.md".to_string()]).unwrap();
        assert!(set.is_match("Templates/note.md"));
        assert!(set.is_match("deep/nested/wip.draft.md"));
        assert!(!set.is_match("Notes/final.md"));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = build_glob_set(&[]).unwrap();
        assert!(!set.is_match("anything.md"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(compile_glob("a{b").is_err());
    }
}
