//! Note descriptors, frontmatter and routing.

pub mod filter;
pub mod frontmatter;
pub mod router;

use std::path::{Path, PathBuf};

use crate::config::Route;

/// Frontmatter property map, insertion-ordered.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Extension of note files, without the dot.
pub const NOTE_EXT: &str = "md";

/// Whether a path names a note file.
pub fn is_note(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == NOTE_EXT)
}

/// String form of a frontmatter value.
///
/// Strings yield their contents; everything else yields its JSON text.
pub fn value_display(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A source note that survived scanning, with its routed destination.
///
/// Created once per scan and never mutated; discarded at the end of the
/// run.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path to the note in the source tree.
    pub absolute_path: PathBuf,
    /// Path relative to the source root, slash-normalized.
    pub relative_path: String,
    /// Normalized frontmatter tags (without `#`).
    pub tags: Vec<String>,
    /// The first route whose condition matched.
    pub route: Route,
    /// Computed destination, absolute.
    pub output_path: PathBuf,
}
