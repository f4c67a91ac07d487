//! Sync orchestration: collision check, write pass, orphan cleanup.
//!
//! One run moves through fixed phases: scan, link-map build, collision
//! check, write, orphan cleanup, report. Collisions abort the whole
//! run before any write; everything after that point only collects
//! per-file errors and keeps going. Nothing is cached between runs —
//! every invocation recomputes state from the filesystem.

mod error;

pub use error::{FileError, FileErrorKind, SyncError};

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::config::SyncConfig;
use crate::debug;
use crate::note::{SourceFile, frontmatter};
use crate::scan::scan_source_files;
use crate::transform::links::LinkMap;
use crate::transform::{
    UnresolvedLink, build_link_map, transform_file_embeds, transform_note,
};
use crate::utils::path::walk_files;

// ============================================================================
// Results
// ============================================================================

/// Aggregate result of one sync run. Not persisted.
#[derive(Debug, Default)]
pub struct SyncResult {
    /// Notes transformed and written.
    pub copied: usize,
    /// Orphaned outputs deleted.
    pub deleted: usize,
    /// Embedded assets copied under `_files/`.
    pub files_copied: usize,
    /// Per-file failures collected along the way.
    pub errors: Vec<FileError>,
    /// Total unresolved wikilinks.
    pub unresolved_count: usize,
    /// The unresolved links themselves (verbose runs only).
    pub unresolved: Vec<UnresolvedLink>,
}

/// What a sync would do, computed without writing.
#[derive(Debug, Default)]
pub struct SyncStatus {
    pub to_copy: Vec<SourceFile>,
    pub to_delete: Vec<PathBuf>,
    pub collisions: Vec<PathBuf>,
}

// ============================================================================
// Public operations
// ============================================================================

/// List the source files a sync would process.
pub fn scan(config: &SyncConfig) -> Result<Vec<SourceFile>, SyncError> {
    Ok(scan_source_files(config)?.files)
}

/// Dry run: report what would be copied, deleted, or collide.
pub fn status(config: &SyncConfig) -> Result<SyncStatus, SyncError> {
    let outcome = scan_source_files(config)?;
    let collisions = detect_collisions(&outcome.files, config);

    let current: FxHashSet<&Path> = outcome.files.iter().map(|f| f.output_path.as_path()).collect();
    let to_delete = find_identity_files(&config.output_dir, &config.user_id)
        .into_iter()
        .filter(|path| !current.contains(path.as_path()))
        .collect();

    Ok(SyncStatus {
        to_copy: outcome.files,
        to_delete,
        collisions,
    })
}

/// Run a full sync.
///
/// Fails atomically on collisions (zero writes, zero deletes). Other
/// failures are recorded per file in the result and never roll back
/// work already written.
pub fn sync(config: &SyncConfig, verbose: bool) -> Result<SyncResult, SyncError> {
    let outcome = scan_source_files(config)?;
    debug!("scan"; "{} source file(s) matched a route", outcome.files.len());

    let link_map = build_link_map(config)?;
    debug!("links"; "link map has {} entries", link_map.len());

    let collisions = detect_collisions(&outcome.files, config);
    if !collisions.is_empty() {
        return Err(SyncError::Collision { paths: collisions });
    }

    let mut result = SyncResult {
        errors: outcome.errors,
        ..SyncResult::default()
    };

    for file in &outcome.files {
        match write_note(file, &link_map, config, &mut result.errors) {
            Ok(written) => {
                result.copied += 1;
                result.files_copied += written.embedded;
                result.unresolved.extend(written.unresolved);
            }
            Err(kind) => result.errors.push(FileError::new(&file.relative_path, kind)),
        }
    }

    // Orphans: this identity's previous output no longer produced by
    // any current source file
    let current: FxHashSet<&Path> = outcome.files.iter().map(|f| f.output_path.as_path()).collect();
    for orphan in find_identity_files(&config.output_dir, &config.user_id) {
        if current.contains(orphan.as_path()) {
            continue;
        }
        match fs::remove_file(&orphan) {
            Ok(()) => result.deleted += 1,
            Err(e) => result
                .errors
                .push(FileError::new(&orphan, FileErrorKind::Io(e))),
        }
    }

    result.unresolved_count = result.unresolved.len();
    if !verbose {
        result.unresolved.clear();
    }

    Ok(result)
}

/// Delete all of this identity's output, ignoring routes. Returns the
/// number of files removed; individual failures are skipped.
pub fn clean(config: &SyncConfig) -> usize {
    find_identity_files(&config.output_dir, &config.user_id)
        .into_iter()
        .filter(|path| fs::remove_file(path).is_ok())
        .count()
}

// ============================================================================
// Write pass
// ============================================================================

struct WrittenNote {
    embedded: usize,
    unresolved: Vec<UnresolvedLink>,
}

/// Read, transform and write one note.
///
/// Non-fatal embed copy failures land in `errors` and the note is
/// still written; a missing embed target abandons the write entirely.
fn write_note(
    file: &SourceFile,
    link_map: &LinkMap,
    config: &SyncConfig,
    errors: &mut Vec<FileError>,
) -> Result<WrittenNote, FileErrorKind> {
    let text = fs::read_to_string(&file.absolute_path).map_err(FileErrorKind::Io)?;
    let (data, body) = frontmatter::parse(&text)
        .map_err(|e| FileErrorKind::Frontmatter(format!("{e:#}")))?;

    let transformed = transform_note(
        body,
        &data.props,
        link_map,
        config,
        &file.absolute_path,
        &file.relative_path,
    )?;

    let embed_outcome = transform_file_embeds(
        &transformed.content,
        &config.source_dir,
        &config.output_dir,
        &file.relative_path,
    );

    let (fatal, recoverable): (Vec<FileError>, Vec<FileError>) = embed_outcome
        .errors
        .into_iter()
        .partition(|e| matches!(e.kind, FileErrorKind::EmbedNotFound(_)));
    errors.extend(recoverable);
    if let Some(missing) = fatal.into_iter().next() {
        return Err(missing.kind);
    }

    let serialized = frontmatter::serialize(&transformed.frontmatter, &embed_outcome.content)
        .map_err(|e| FileErrorKind::Frontmatter(format!("{e:#}")))?;

    if let Some(parent) = file.output_path.parent() {
        fs::create_dir_all(parent).map_err(FileErrorKind::Io)?;
    }
    fs::write(&file.output_path, serialized).map_err(FileErrorKind::Io)?;

    Ok(WrittenNote {
        embedded: embed_outcome.copied.len(),
        unresolved: transformed.unresolved,
    })
}

// ============================================================================
// Collisions and orphans
// ============================================================================

/// Destination paths whose base name already belongs to a different
/// contributor's file in the same directory.
///
/// Runs before any write; a non-empty result aborts the sync. Only
/// meaningful with multi-user naming — without the identity suffix
/// there is no other-identity base name to collide with.
fn detect_collisions(files: &[SourceFile], config: &SyncConfig) -> Vec<PathBuf> {
    if !config.multi_user {
        return Vec::new();
    }

    let suffix = format!(".{}", config.user_id);
    let mut collisions = Vec::new();

    for file in files {
        let Some(dir) = file.output_path.parent() else {
            continue;
        };
        let Some(filename) = file.output_path.file_name() else {
            continue;
        };
        let stem = file
            .output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Output names are `<base>.<identity>.<ext>`
        let Some(base) = stem.strip_suffix(suffix.as_str()) else {
            continue;
        };

        // Destination directory may not exist yet: no collision possible
        let Ok(entries) = fs::read_dir(dir) else {
            continue;
        };

        let other_prefix = format!("{base}.");
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.file_name() == Some(filename) {
                continue;
            }
            let other_stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if other_stem.starts_with(&other_prefix) {
                collisions.push(file.output_path.clone());
                break;
            }
        }
    }

    collisions.sort();
    collisions
}

/// Every output file carrying this identity's suffix.
fn find_identity_files(output_dir: &Path, user_id: &str) -> Vec<PathBuf> {
    let suffix = format!(".{user_id}.md");
    walk_files(output_dir)
        .into_iter()
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(&suffix))
        })
        .collect()
}
