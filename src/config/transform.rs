//! The `[transform]` config section.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How wikilinks in note bodies are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WikilinkBehavior {
    /// Replace resolvable spans with standard links; leave the rest
    /// untouched but record them as unresolved.
    #[default]
    Resolve,
    /// Like `resolve`, but unresolvable spans are deleted.
    Remove,
    /// Leave every span alone and record nothing.
    Preserve,
}

/// External commands plugged into the transformation pipeline.
///
/// Each command receives the value on stdin and prints the rewritten
/// value on stdout; see [`crate::transform::hooks::CommandHook`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HookCommands {
    /// Per-property rewriters for passthrough frontmatter values.
    pub property: BTreeMap<String, Vec<String>>,
    /// Rewriter for the fully assembled content, applied last.
    pub content: Option<Vec<String>>,
    /// Rewriter for the output filename stem, before the identity
    /// suffix is appended.
    pub filename: Option<Vec<String>>,
}

impl HookCommands {
    fn is_empty(&self) -> bool {
        self.property.is_empty() && self.content.is_none() && self.filename.is_none()
    }
}

/// Transformation settings, merged from repo and user config.
///
/// Fields left unset fall back to defaults through the accessor
/// methods, which are the only way the pipeline reads them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Frontmatter property holding each note's canonical URL.
    pub url_property: Option<String>,
    /// Properties projected into the body as heading + bullet list.
    pub content_properties: Option<Vec<String>>,
    /// Properties copied (or hook-rewritten) into output frontmatter.
    pub passthrough_properties: Option<Vec<String>>,
    /// Body wikilink handling.
    pub wikilink_behavior: Option<WikilinkBehavior>,
    /// URL overrides keyed by source-relative path; these win over any
    /// frontmatter-derived URL.
    pub link_overrides: Option<BTreeMap<String, String>>,
    /// External rewrite commands.
    pub hooks: HookCommands,
}

impl TransformConfig {
    pub fn url_property(&self) -> &str {
        self.url_property.as_deref().unwrap_or("link_to")
    }

    pub fn content_properties(&self) -> &[String] {
        self.content_properties.as_deref().unwrap_or(&[])
    }

    pub fn passthrough_properties(&self) -> &[String] {
        self.passthrough_properties.as_deref().unwrap_or(&[])
    }

    pub fn wikilink_behavior(&self) -> WikilinkBehavior {
        self.wikilink_behavior.unwrap_or_default()
    }

    pub fn link_override(&self, relative_path: &str) -> Option<&str> {
        self.link_overrides
            .as_ref()
            .and_then(|map| map.get(relative_path))
            .map(String::as_str)
    }

    /// Merge repo and user settings: the repo wins field-wise, link
    /// overrides merge with repo entries taking precedence.
    pub fn merged(repo: Self, user: Self) -> Self {
        let link_overrides = match (repo.link_overrides, user.link_overrides) {
            (Some(repo_map), Some(user_map)) => {
                let mut merged = user_map;
                merged.extend(repo_map);
                Some(merged)
            }
            (repo_map, user_map) => repo_map.or(user_map),
        };

        Self {
            url_property: repo.url_property.or(user.url_property),
            content_properties: repo.content_properties.or(user.content_properties),
            passthrough_properties: repo
                .passthrough_properties
                .or(user.passthrough_properties),
            wikilink_behavior: repo.wikilink_behavior.or(user.wikilink_behavior),
            link_overrides,
            hooks: if repo.hooks.is_empty() {
                user.hooks
            } else {
                repo.hooks
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = TransformConfig::default();
        assert_eq!(t.url_property(), "link_to");
        assert!(t.content_properties().is_empty());
        assert_eq!(t.wikilink_behavior(), WikilinkBehavior::Resolve);
    }

    #[test]
    fn test_behavior_deserialize() {
        let t: TransformConfig = toml::from_str("wikilink_behavior = \"remove\"").unwrap();
        assert_eq!(t.wikilink_behavior(), WikilinkBehavior::Remove);
    }

    #[test]
    fn test_merge_repo_wins() {
        let repo: TransformConfig = toml::from_str("url_property = \"url\"").unwrap();
        let user: TransformConfig =
            toml::from_str("url_property = \"web\"\nwikilink_behavior = \"preserve\"").unwrap();

        let merged = TransformConfig::merged(repo, user);
        assert_eq!(merged.url_property(), "url");
        // User value survives where the repo is silent
        assert_eq!(merged.wikilink_behavior(), WikilinkBehavior::Preserve);
    }

    #[test]
    fn test_merge_link_overrides() {
        let repo: TransformConfig =
            toml::from_str("[link_overrides]\n\"a.md\" = \"https://repo/a\"").unwrap();
        let user: TransformConfig = toml::from_str(
            "[link_overrides]\n\"a.md\" = \"https://user/a\"\n\"b.md\" = \"https://user/b\"",
        )
        .unwrap();

        let merged = TransformConfig::merged(repo, user);
        assert_eq!(merged.link_override("a.md"), Some("https://repo/a"));
        assert_eq!(merged.link_override("b.md"), Some("https://user/b"));
    }
}
