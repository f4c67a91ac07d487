//! Routing rules from config.

use serde::{Deserialize, Serialize};

/// A routing rule mapping source notes to an output subdirectory.
///
/// Rules are evaluated in config order; the first match wins. At least
/// one of `source_path` / `tag` must be set.
///
/// ```toml
/// [[route]]
/// source_path = "Logs/**/*.md"
/// output = "logs"
///
/// [[route]]
/// tag = "work"
/// output = "projects"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    /// Glob matched against the note's source-relative path.
    #[serde(default)]
    pub source_path: Option<String>,

    /// Frontmatter tag to match (without the `#` prefix).
    #[serde(default)]
    pub tag: Option<String>,

    /// Output subdirectory, relative to the output root. `"."` places
    /// files directly in the output root.
    pub output: String,
}

impl Route {
    /// Whether this rule carries at least one condition.
    pub fn has_condition(&self) -> bool {
        self.source_path.is_some() || self.tag.is_some()
    }
}
