//! Source tree scanning: walk, filter, route, compute destinations.

use std::path::{Path, PathBuf};

use crate::config::SyncConfig;
use crate::note::filter::has_required_fields;
use crate::note::router::match_route;
use crate::note::{JsonMap, SourceFile, frontmatter, is_note};
use crate::sync::{FileError, FileErrorKind, SyncError};
use crate::transform::hooks::HookContext;
use crate::utils::glob::build_glob_set;
use crate::utils::path::{relative_slash, walk_files};

/// Everything one scan produced: routed files plus per-file failures.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub files: Vec<SourceFile>,
    pub errors: Vec<FileError>,
}

/// Scan the source tree and compute each surviving note's destination.
///
/// Exclusion globs, required tags/properties and routing all apply
/// here; a note failing any of them is silently excluded (not an
/// error). Unreadable files and malformed frontmatter are per-file
/// errors; the scan continues.
pub fn scan_source_files(config: &SyncConfig) -> Result<ScanOutcome, SyncError> {
    let exclude = build_glob_set(&config.exclude)?;
    let mut outcome = ScanOutcome::default();

    for absolute_path in walk_files(&config.source_dir) {
        if !is_note(&absolute_path) {
            continue;
        }
        let relative_path = relative_slash(&absolute_path, &config.source_dir);
        if exclude.is_match(&relative_path) {
            continue;
        }

        let text = match std::fs::read_to_string(&absolute_path) {
            Ok(text) => text,
            Err(e) => {
                outcome
                    .errors
                    .push(FileError::new(&relative_path, FileErrorKind::Io(e)));
                continue;
            }
        };

        let data = match frontmatter::parse(&text) {
            Ok((data, _)) => data,
            Err(e) => {
                outcome.errors.push(FileError::new(
                    &relative_path,
                    FileErrorKind::Frontmatter(format!("{e:#}")),
                ));
                continue;
            }
        };

        if !has_required_fields(&data, &config.require_tags, &config.require_props) {
            continue;
        }

        let Some(route) = match_route(&relative_path, &data.tags, &config.routes) else {
            continue;
        };

        let output_path =
            match output_path(&absolute_path, &route.output, config, &data.props) {
                Ok(path) => path,
                Err(kind) => {
                    outcome.errors.push(FileError::new(&relative_path, kind));
                    continue;
                }
            };

        outcome.files.push(SourceFile {
            absolute_path,
            relative_path,
            tags: data.tags,
            route: route.clone(),
            output_path,
        });
    }

    Ok(outcome)
}

/// Destination for one source note.
///
/// `<stem>.<identity>.<ext>` under the route's output subdirectory;
/// the identity suffix is omitted when multi-user naming is disabled.
/// A configured filename hook rewrites the stem first.
fn output_path(
    source: &Path,
    route_output: &str,
    config: &SyncConfig,
    props: &JsonMap,
) -> Result<PathBuf, FileErrorKind> {
    let mut stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Some(hook) = config.hooks.filename() {
        let ctx = HookContext {
            file_path: source,
            frontmatter: props,
        };
        stem = hook.apply(&stem, &ctx).map_err(|e| FileErrorKind::Hook {
            hook: hook.name().to_string(),
            message: format!("{e:#}"),
        })?;
    }

    let filename = if config.multi_user {
        format!("{stem}.{}.{ext}", config.user_id)
    } else {
        format!("{stem}.{ext}")
    };

    // `.` routes straight into the output root
    let dir = if route_output == "." {
        config.output_dir.clone()
    } else {
        config.output_dir.join(route_output)
    };

    Ok(dir.join(filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Route;
    use crate::transform::hooks::{HookSet, TransformHook};
    use std::fs;
    use tempfile::TempDir;

    fn route(source_path: Option<&str>, tag: Option<&str>, output: &str) -> Route {
        Route {
            source_path: source_path.map(String::from),
            tag: tag.map(String::from),
            output: output.to_string(),
        }
    }

    fn config(dir: &TempDir, routes: Vec<Route>) -> SyncConfig {
        let source_dir = dir.path().join("vault");
        fs::create_dir_all(&source_dir).unwrap();
        SyncConfig {
            root: dir.path().to_path_buf(),
            user_id: "alice".to_string(),
            multi_user: true,
            source_dir,
            output_dir: dir.path().join("notes"),
            routes,
            ..SyncConfig::default()
        }
    }

    fn write_note(config: &SyncConfig, rel: &str, content: &str) {
        let path = config.source_dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_routing_scenario() {
        let dir = TempDir::new().unwrap();
        let config = config(
            &dir,
            vec![
                route(Some("Logs/**/*.md"), None, "logs"),
                route(None, Some("work"), "projects"),
            ],
        );
        write_note(&config, "Logs/daily.md", "no tags here");
        write_note(&config, "project.md", "---\ntags: [work]\n---\nx");

        let outcome = scan_source_files(&config).unwrap();
        assert_eq!(outcome.files.len(), 2);
        assert!(outcome.errors.is_empty());

        let by_rel = |rel: &str| {
            outcome
                .files
                .iter()
                .find(|f| f.relative_path == rel)
                .unwrap()
        };
        assert_eq!(
            by_rel("Logs/daily.md").output_path,
            config.output_dir.join("logs/daily.alice.md")
        );
        assert_eq!(
            by_rel("project.md").output_path,
            config.output_dir.join("projects/project.alice.md")
        );
    }

    #[test]
    fn test_unrouted_files_excluded() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, vec![route(Some("Logs/**"), None, "logs")]);
        write_note(&config, "stray.md", "x");

        let outcome = scan_source_files(&config).unwrap();
        assert!(outcome.files.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_exclude_globs() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, vec![route(Some("**/*.md"), None, ".")]);
        config.exclude = vec!["Templates/**".to_string()];
        write_note(&config, "Templates/skel.md", "x");
        write_note(&config, "real.md", "x");

        let outcome = scan_source_files(&config).unwrap();
        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.files[0].relative_path, "real.md");
    }

    #[test]
    fn test_required_tags_filter() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, vec![route(Some("**/*.md"), None, ".")]);
        config.require_tags = vec!["publish".to_string()];
        write_note(&config, "yes.md", "---\ntags: [publish]\n---\nx");
        write_note(&config, "no.md", "---\ntags: [draft]\n---\nx");

        let outcome = scan_source_files(&config).unwrap();
        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.files[0].relative_path, "yes.md");
    }

    #[test]
    fn test_dot_route_output() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, vec![route(Some("**/*.md"), None, ".")]);
        write_note(&config, "top.md", "x");

        let outcome = scan_source_files(&config).unwrap();
        assert_eq!(
            outcome.files[0].output_path,
            config.output_dir.join("top.alice.md")
        );
    }

    #[test]
    fn test_single_user_naming() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, vec![route(Some("**/*.md"), None, ".")]);
        config.multi_user = false;
        write_note(&config, "top.md", "x");

        let outcome = scan_source_files(&config).unwrap();
        assert_eq!(
            outcome.files[0].output_path,
            config.output_dir.join("top.md")
        );
    }

    #[test]
    fn test_malformed_frontmatter_is_per_file_error() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, vec![route(Some("**/*.md"), None, ".")]);
        write_note(&config, "bad.md", "---\n{ not: [valid\n---\nx");
        write_note(&config, "good.md", "x");

        let outcome = scan_source_files(&config).unwrap();
        assert_eq!(outcome.files.len(), 1);
        assert_eq!(outcome.files[0].relative_path, "good.md");
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0].kind,
            FileErrorKind::Frontmatter(_)
        ));
    }

    struct Slugify;
    impl TransformHook for Slugify {
        fn name(&self) -> &str {
            "slugify"
        }
        fn apply(
            &self,
            value: &str,
            _ctx: &HookContext<'_>,
        ) -> anyhow::Result<String> {
            Ok(value.to_lowercase().replace(' ', "-"))
        }
    }

    #[test]
    fn test_filename_hook_rewrites_stem() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, vec![route(Some("**/*.md"), None, ".")]);
        let mut hooks = HookSet::default();
        hooks.set_filename(Slugify);
        config.hooks = hooks;
        write_note(&config, "My Note.md", "x");

        let outcome = scan_source_files(&config).unwrap();
        assert_eq!(
            outcome.files[0].output_path,
            config.output_dir.join("my-note.alice.md")
        );
    }

    #[test]
    fn test_non_markdown_ignored() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, vec![route(Some("**"), None, ".")]);
        write_note(&config, "photo.png", "binaryish");

        let outcome = scan_source_files(&config).unwrap();
        assert!(outcome.files.is_empty());
    }
}
