//! The per-note transformation: property projection, link rewriting,
//! hooks, frontmatter filtering.

use std::path::Path;

use serde_json::Value;

use crate::config::{SyncConfig, WikilinkBehavior};
use crate::note::JsonMap;
use crate::sync::FileErrorKind;
use crate::transform::hooks::HookContext;

use super::links::{LinkMap, collapse_wikilinks, transform_wikilinks};
use super::UnresolvedLink;

/// Output of one note's transformation. Pure function of (body,
/// frontmatter, link map, config, path) — no hidden state.
#[derive(Debug)]
pub struct TransformOutcome {
    /// Assembled body: content-property blocks, separator, body.
    pub content: String,
    /// Output frontmatter: passthrough properties only.
    pub frontmatter: JsonMap,
    /// Content-property records first, body records after.
    pub unresolved: Vec<UnresolvedLink>,
}

/// Transform one note's body and frontmatter.
///
/// Steps, in order: content-property projection (wikilinks forced to
/// resolve, leftovers collapsed to display text), body rewrite with
/// the configured behavior, block assembly, content hook, passthrough
/// frontmatter with property hooks. A hook failure is a per-file
/// error; the caller skips the file and keeps the run going.
pub fn transform_note(
    body: &str,
    frontmatter: &JsonMap,
    link_map: &LinkMap,
    config: &SyncConfig,
    file_path: &Path,
    relative_path: &str,
) -> Result<TransformOutcome, FileErrorKind> {
    let transform = &config.transform;
    let mut unresolved = Vec::new();

    // Content properties become "## Heading" + bullet list blocks
    let mut blocks = Vec::new();
    for prop in transform.content_properties() {
        let Some(value) = frontmatter.get(prop) else {
            continue;
        };

        let mut items = Vec::new();
        for item in property_items(value) {
            let result =
                transform_wikilinks(&item, link_map, WikilinkBehavior::Resolve, relative_path);
            unresolved.extend(result.unresolved);

            // Property rendering never leaves raw [[...]] syntax
            let cleaned = collapse_wikilinks(&result.content);
            if !cleaned.trim().is_empty() {
                items.push(format!("- {cleaned}"));
            }
        }

        if !items.is_empty() {
            blocks.push(format!("## {}\n\n{}", capitalize(prop), items.join("\n")));
        }
    }

    // Main body uses the configured behavior
    let body_result =
        transform_wikilinks(body, link_map, transform.wikilink_behavior(), relative_path);
    unresolved.extend(body_result.unresolved);

    let mut content = if blocks.is_empty() {
        body_result.content
    } else {
        format!("{}\n\n---\n\n{}", blocks.join("\n\n"), body_result.content)
    };

    let ctx = HookContext {
        file_path,
        frontmatter,
    };

    if let Some(hook) = config.hooks.content() {
        content = hook.apply(&content, &ctx).map_err(|e| FileErrorKind::Hook {
            hook: hook.name().to_string(),
            message: format!("{e:#}"),
        })?;
    }

    // Output frontmatter keeps only the configured passthrough
    // properties; everything else is dropped
    let mut out_frontmatter = JsonMap::new();
    for prop in transform.passthrough_properties() {
        let Some(value) = frontmatter.get(prop) else {
            continue;
        };

        let value = match (config.hooks.property(prop), value) {
            (Some(hook), Value::String(s)) => {
                let rewritten = hook.apply(s, &ctx).map_err(|e| FileErrorKind::Hook {
                    hook: hook.name().to_string(),
                    message: format!("{e:#}"),
                })?;
                Value::String(rewritten)
            }
            // Non-string values bypass hooks unchanged
            _ => value.clone(),
        };
        out_frontmatter.insert(prop.clone(), value);
    }

    Ok(TransformOutcome {
        content,
        frontmatter: out_frontmatter,
        unresolved,
    })
}

/// Coerce a frontmatter value into list items for projection.
///
/// Strings split on commas and newlines; arrays stringify each
/// element; objects become one JSON-stringified item; scalars their
/// string form.
fn property_items(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => s
            .split([',', '\n'])
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| crate::note::value_display(item).trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        Value::Object(_) => vec![value.to_string()],
        other => vec![other.to_string()],
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
