//! Path helpers: slash-normalized relative paths and iterative tree walks.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Relative path from `root` to `path`, joined with `/` regardless of
/// platform. Paths outside `root` are returned as-is.
///
/// Glob patterns, link-map keys and output reports all use this form,
/// so it is the one canonical spelling of a source-relative path.
pub fn relative_slash(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Walk every file under `root` breadth-first, without recursion.
///
/// Uses an explicit work list so arbitrarily deep trees cannot exhaust
/// the stack. Unreadable directories are skipped and the walk continues.
/// Entries within each directory are visited in name order, which keeps
/// the result deterministic across platforms.
pub fn walk_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut queue = VecDeque::from([root.to_path_buf()]);

    while let Some(dir) = queue.pop_front() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                queue.push_back(path);
            } else {
                files.push(path);
            }
        }
    }

    files
}
