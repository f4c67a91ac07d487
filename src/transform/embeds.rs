//! File embeds: locate referenced assets, copy them under `_files/`,
//! rewrite the embed syntax into standard links.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::sync::{FileError, FileErrorKind};
use crate::utils::path::relative_slash;

/// Output subtree embedded assets are copied into.
pub const FILES_DIR: &str = "_files";

/// Extensions rendered with image syntax even without a `!` prefix.
const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico"];

/// `[[file.ext]]` or `![[file.ext]]`, optional `|display`.
static EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)\[\[([^\]|]+\.\w+)(\|([^\]]+))?\]\]").expect("valid regex")
});

/// An embed found in note text. Produced and consumed within one
/// file's transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEmbed {
    /// The matched span, verbatim.
    pub original: String,
    /// Referenced file name, e.g. `photo.png`.
    pub filename: String,
    /// Render with image syntax (`!` prefix or recognized image
    /// extension).
    pub is_image: bool,
    pub display: Option<String>,
}

/// Result of one embed transformation pass.
#[derive(Debug, Default)]
pub struct EmbedOutcome {
    pub content: String,
    /// Output-relative paths of copied assets.
    pub copied: Vec<String>,
    /// Copy failures; `EmbedNotFound` entries abandon the file's write.
    pub errors: Vec<FileError>,
}

/// Find all file embeds in `content`. `.md` targets are wikilinks,
/// never embeds.
pub fn find_file_embeds(content: &str) -> Vec<FileEmbed> {
    EMBED
        .captures_iter(content)
        .filter_map(|caps| {
            let filename = caps[2].trim().to_string();
            let ext = extension_lower(&filename);
            if ext == "md" {
                return None;
            }

            let has_bang = &caps[1] == "!";
            let is_image = has_bang || IMAGE_EXTENSIONS.contains(&ext.as_str());

            Some(FileEmbed {
                original: caps[0].to_string(),
                filename,
                is_image,
                display: caps.get(4).map(|d| d.as_str().trim().to_string()),
            })
        })
        .collect()
}

/// Locate a file anywhere under the source root by exact basename.
///
/// Breadth-first with an explicit queue; the first match wins and ties
/// between directories are not disambiguated. Unreadable directories
/// are skipped.
pub fn find_file_in_source(source_root: &Path, filename: &str) -> Option<PathBuf> {
    let mut queue = VecDeque::from([source_root.to_path_buf()]);

    while let Some(dir) = queue.pop_front() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                queue.push_back(path);
            } else if path.file_name().is_some_and(|name| name == filename) {
                return Some(path);
            }
        }
    }

    None
}

/// Copy an embedded file into the output `_files/` subtree, preserving
/// its path relative to the source root. Returns the output-relative
/// path of the copy.
pub fn copy_embedded_file(
    source_file: &Path,
    source_root: &Path,
    output_root: &Path,
) -> std::io::Result<String> {
    let rel = relative_slash(source_file, source_root);
    let output_path = output_root.join(FILES_DIR).join(&rel);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source_file, &output_path)?;

    Ok(format!("{FILES_DIR}/{rel}"))
}

/// Transform every embed in `content`: locate, copy, rewrite.
///
/// A missing asset is recorded as `EmbedNotFound` — the caller must
/// abandon this file's write. A copy failure is recorded and the
/// remaining embeds still process.
pub fn transform_file_embeds(
    content: &str,
    source_root: &Path,
    output_root: &Path,
    current_file: &str,
) -> EmbedOutcome {
    let embeds = find_file_embeds(content);
    let mut outcome = EmbedOutcome {
        content: content.to_string(),
        ..EmbedOutcome::default()
    };

    for embed in embeds {
        let Some(source_file) = find_file_in_source(source_root, &embed.filename) else {
            outcome.errors.push(FileError::new(
                current_file,
                FileErrorKind::EmbedNotFound(embed.filename.clone()),
            ));
            continue;
        };

        let rel = match copy_embedded_file(&source_file, source_root, output_root) {
            Ok(rel) => rel,
            Err(e) => {
                outcome
                    .errors
                    .push(FileError::new(current_file, FileErrorKind::Io(e)));
                continue;
            }
        };

        let text = embed
            .display
            .clone()
            .unwrap_or_else(|| stem(&embed.filename));
        let replacement = if embed.is_image {
            format!("![{text}](/{rel})")
        } else {
            format!("[{text}](/{rel})")
        };

        outcome.content = outcome.content.replacen(&embed.original, &replacement, 1);
        outcome.copied.push(rel);
    }

    outcome
}

fn extension_lower(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

fn stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_embeds() {
        let embeds = find_file_embeds("a ![[photo.png]] b [[doc.pdf|the doc]] c [[note.md]]");
        assert_eq!(embeds.len(), 2);

        assert_eq!(embeds[0].filename, "photo.png");
        assert!(embeds[0].is_image);
        assert!(embeds[0].display.is_none());

        assert_eq!(embeds[1].filename, "doc.pdf");
        assert!(!embeds[1].is_image);
        assert_eq!(embeds[1].display.as_deref(), Some("the doc"));
    }

    #[test]
    fn test_image_without_bang() {
        let embeds = find_file_embeds("[[chart.svg]]");
        assert_eq!(embeds.len(), 1);
        assert!(embeds[0].is_image);
    }

    #[test]
    fn test_bang_on_non_image() {
        let embeds = find_file_embeds("![[data.csv]]");
        assert_eq!(embeds.len(), 1);
        assert!(embeds[0].is_image);
    }

    #[test]
    fn test_md_never_an_embed() {
        assert!(find_file_embeds("[[note.md]] ![[other.md]]").is_empty());
    }

    #[test]
    fn test_find_file_breadth_first() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("deep/nested")).unwrap();
        fs::write(dir.path().join("deep/nested/photo.png"), "deep").unwrap();
        fs::write(dir.path().join("photo.png"), "shallow").unwrap();

        // Shallow match wins over the deep one
        let found = find_file_in_source(dir.path(), "photo.png").unwrap();
        assert_eq!(found, dir.path().join("photo.png"));
    }

    #[test]
    fn test_find_file_missing() {
        let dir = TempDir::new().unwrap();
        assert!(find_file_in_source(dir.path(), "nope.png").is_none());
    }

    #[test]
    fn test_copy_preserves_relative_path() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("vault");
        let output = dir.path().join("out");
        fs::create_dir_all(source.join("images")).unwrap();
        fs::write(source.join("images/photo.png"), "png").unwrap();

        let rel = copy_embedded_file(&source.join("images/photo.png"), &source, &output).unwrap();
        assert_eq!(rel, "_files/images/photo.png");
        assert_eq!(
            fs::read_to_string(output.join("_files/images/photo.png")).unwrap(),
            "png"
        );
    }

    #[test]
    fn test_transform_rewrites_and_copies() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("vault");
        let output = dir.path().join("out");
        fs::create_dir_all(source.join("images")).unwrap();
        fs::write(source.join("images/photo.png"), "png").unwrap();

        let outcome =
            transform_file_embeds("before ![[photo.png]] after", &source, &output, "n.md");

        assert_eq!(
            outcome.content,
            "before ![photo](/_files/images/photo.png) after"
        );
        assert_eq!(outcome.copied, vec!["_files/images/photo.png"]);
        assert!(outcome.errors.is_empty());
        assert!(output.join("_files/images/photo.png").exists());
    }

    #[test]
    fn test_transform_display_text() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("vault");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("report.pdf"), "pdf").unwrap();

        let outcome = transform_file_embeds(
            "[[report.pdf|the report]]",
            &source,
            &dir.path().join("out"),
            "n.md",
        );
        assert_eq!(outcome.content, "[the report](/_files/report.pdf)");
    }

    #[test]
    fn test_transform_missing_embed() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("vault");
        fs::create_dir_all(&source).unwrap();

        let outcome =
            transform_file_embeds("![[ghost.png]]", &source, &dir.path().join("out"), "n.md");

        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0].kind,
            FileErrorKind::EmbedNotFound(_)
        ));
        // The span stays as-is; the caller abandons the write anyway
        assert_eq!(outcome.content, "![[ghost.png]]");
    }

    #[test]
    fn test_transform_duplicate_embeds() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("vault");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("a.png"), "x").unwrap();

        let outcome = transform_file_embeds(
            "![[a.png]] mid ![[a.png]]",
            &source,
            &dir.path().join("out"),
            "n.md",
        );
        assert_eq!(
            outcome.content,
            "![a](/_files/a.png) mid ![a](/_files/a.png)"
        );
        assert_eq!(outcome.copied.len(), 2);
    }
}
