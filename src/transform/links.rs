//! Link map construction and wikilink rewriting.
//!
//! The link map is built once per run from the *entire* source tree,
//! independent of routing: every note's `url_property` frontmatter
//! value (default `link_to`) becomes the canonical URL for its
//! relative path. Explicit overrides from config win over anything
//! derived from frontmatter.

use std::collections::BTreeMap;
use std::fs;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::{SyncConfig, WikilinkBehavior};
use crate::note::{frontmatter, is_note, value_display};
use crate::sync::SyncError;
use crate::utils::glob::build_glob_set;
use crate::utils::path::{relative_slash, walk_files};

use super::UnresolvedLink;

/// Source-relative path (ending in `.md`) -> canonical URL.
pub type LinkMap = BTreeMap<String, String>;

/// `[[target]]` or `[[target|display]]`.
static WIKILINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(\|([^\]]+))?\]\]").expect("valid regex"));

/// Build the link map for one run.
///
/// Walks every markdown file under the source root, skipping excluded
/// paths. Files lacking a resolvable URL (or with unreadable
/// frontmatter) are simply absent from the map; their wikilinks will
/// come back unresolved.
pub fn build_link_map(config: &SyncConfig) -> Result<LinkMap, SyncError> {
    let exclude = build_glob_set(&config.exclude)?;
    let url_property = config.transform.url_property();
    let mut map = LinkMap::new();

    for path in walk_files(&config.source_dir) {
        if !is_note(&path) {
            continue;
        }
        let rel = relative_slash(&path, &config.source_dir);
        if exclude.is_match(&rel) {
            continue;
        }

        // Overrides win without even reading the file
        if let Some(url) = config.transform.link_override(&rel) {
            map.insert(rel, url.to_string());
            continue;
        }

        let Ok(text) = fs::read_to_string(&path) else {
            continue;
        };
        let Ok((data, _)) = frontmatter::parse(&text) else {
            continue;
        };
        if let Some(url) = data.props.get(url_property) {
            map.insert(rel, value_display(url));
        }
    }

    Ok(map)
}

/// Result of one wikilink rewriting pass.
#[derive(Debug, Clone)]
pub struct WikilinkResult {
    pub content: String,
    pub unresolved: Vec<UnresolvedLink>,
}

/// Rewrite `[[...]]` spans in `content` against the link map.
///
/// Lookup appends the note extension when the target lacks it. Spans
/// whose target carries a non-note extension are embed syntax and are
/// left for the embed transformer (no substitution, no record).
///
/// Behaviors:
/// - `resolve`: matched spans become `[text](url)`; unmatched spans
///   stay in the text but are recorded as unresolved.
/// - `remove`: unmatched spans are deleted and recorded.
/// - `preserve`: the input is returned unchanged, nothing is recorded.
pub fn transform_wikilinks(
    content: &str,
    link_map: &LinkMap,
    behavior: WikilinkBehavior,
    current_file: &str,
) -> WikilinkResult {
    if behavior == WikilinkBehavior::Preserve {
        return WikilinkResult {
            content: content.to_string(),
            unresolved: Vec::new(),
        };
    }

    let mut unresolved = Vec::new();

    let content = WIKILINK.replace_all(content, |caps: &Captures<'_>| {
        let target = caps[1].trim();
        if is_embed_target(target) {
            return caps[0].to_string();
        }

        let text = caps
            .get(3)
            .map_or(target, |display| display.as_str().trim());

        let key = if target.ends_with(".md") {
            target.to_string()
        } else {
            format!("{target}.md")
        };

        match link_map.get(&key) {
            Some(url) => format!("[{text}]({url})"),
            None => {
                unresolved.push(UnresolvedLink {
                    wikilink: caps[0].to_string(),
                    file_path: current_file.to_string(),
                });
                if behavior == WikilinkBehavior::Remove {
                    String::new()
                } else {
                    caps[0].to_string()
                }
            }
        }
    });

    WikilinkResult {
        content: content.into_owned(),
        unresolved,
    }
}

/// Collapse any remaining `[[...]]` markup to its display text.
///
/// `[[Link]]` becomes `Link`, `[[Link|Text]]` becomes `Text`. Used for
/// content-property rendering, which never leaves raw bracket syntax.
pub fn collapse_wikilinks(content: &str) -> String {
    WIKILINK
        .replace_all(content, |caps: &Captures<'_>| {
            caps.get(3)
                .map_or_else(|| caps[1].trim().to_string(), |d| d.as_str().trim().to_string())
        })
        .into_owned()
}

/// Whether a wikilink target names a non-note file (embed syntax).
fn is_embed_target(target: &str) -> bool {
    let Some((stem, ext)) = target.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && !ext.is_empty()
        && ext
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !ext.eq_ignore_ascii_case("md")
}
