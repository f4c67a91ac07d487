//! Sync error taxonomy.
//!
//! Two tiers: [`SyncError`] aborts the whole run before any mutation;
//! [`FileError`] is recorded against one file and the run continues.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal sync failures. Nothing has been written when one is raised.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Destination base names that already belong to another
    /// contributor. Collisions are fatal-by-design, never partially
    /// applied.
    #[error(
        "collision: destination file(s) would conflict with other contributors, resolve manually:\n{}",
        format_paths(.paths)
    )]
    Collision { paths: Vec<PathBuf> },

    /// A glob from config failed to compile. Config validation catches
    /// this at load; seeing it here means the pattern changed since.
    #[error("invalid glob pattern")]
    Glob(#[from] globset::Error),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("  {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A non-fatal failure recorded for a single file.
#[derive(Debug)]
pub struct FileError {
    /// Source-relative path of the file the failure belongs to.
    pub path: PathBuf,
    pub kind: FileErrorKind,
}

impl FileError {
    pub fn new(path: impl Into<PathBuf>, kind: FileErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.kind)
    }
}

/// What went wrong with one file.
#[derive(Debug, Error)]
pub enum FileErrorKind {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Frontmatter(String),

    /// The embed target is missing from the source tree. This one also
    /// abandons the invoking file's write.
    #[error("embedded file not found in source tree: {0}")]
    EmbedNotFound(String),

    #[error("hook `{hook}` failed: {message}")]
    Hook { hook: String, message: String },
}
