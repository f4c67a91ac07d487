//! Frontmatter parsing: split the leading `---` block, normalize tags.
//!
//! Notes carry an optional YAML block fenced by `---` lines at the top
//! of the file. The raw property map is kept untouched for later
//! projection; only `tags` gets normalized into a canonical list.

use anyhow::{Result, anyhow};

use super::JsonMap;

/// Parsed metadata of one note.
///
/// Derived from a single read of the file and never cached across
/// files.
#[derive(Debug, Clone, Default)]
pub struct FrontmatterData {
    /// Normalized tags: `#` stripped, trimmed, empties dropped.
    pub tags: Vec<String>,
    /// The raw property map, exactly as written (including `tags`).
    pub props: JsonMap,
}

/// Split content into (frontmatter text, body) if a leading `---`
/// block exists.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let trimmed = content.trim_start();

    if trimmed.starts_with("---")
        && let Some(end) = trimmed[3..].find("\n---")
    {
        let fm = trimmed[3..3 + end].trim();
        let body = trimmed[3 + end + 4..].trim_start_matches('\n');
        return Some((fm, body));
    }

    None
}

/// Parse a note into its metadata and body.
///
/// A malformed metadata block is an error for this file only; callers
/// skip the file and keep the run going.
pub fn parse(content: &str) -> Result<(FrontmatterData, &str)> {
    let Some((fm, body)) = split(content) else {
        return Ok((FrontmatterData::default(), content));
    };
    if fm.is_empty() {
        return Ok((FrontmatterData::default(), body));
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(fm).map_err(|e| anyhow!("invalid frontmatter: {e}"))?;

    let props = match serde_json::to_value(&value)
        .map_err(|e| anyhow!("invalid frontmatter: {e}"))?
    {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => JsonMap::new(),
        other => return Err(anyhow!("frontmatter is not a map (found {other})")),
    };

    let tags = extract_tags(&props);
    Ok((FrontmatterData { tags, props }, body))
}

/// Serialize an output property map and body back into note text.
///
/// An empty map produces the body alone, with no fences. The YAML
/// rendering is deterministic (insertion order preserved), so repeated
/// syncs write identical bytes.
pub fn serialize(frontmatter: &JsonMap, body: &str) -> Result<String> {
    if frontmatter.is_empty() {
        return Ok(body.to_string());
    }

    let yaml =
        serde_yaml::to_string(frontmatter).map_err(|e| anyhow!("frontmatter render: {e}"))?;
    Ok(format!("---\n{yaml}---\n\n{body}"))
}

/// Normalize the `tags` property into a list of tag strings.
///
/// A list keeps only its string elements; a single string splits on
/// commas and/or whitespace. Each token loses one leading `#` and any
/// surrounding whitespace; empties are dropped.
fn extract_tags(props: &JsonMap) -> Vec<String> {
    match props.get("tags") {
        Some(serde_json::Value::String(s)) => s
            .split([',', ' ', '\t', '\n'])
            .filter_map(normalize_tag)
            .collect(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .filter_map(normalize_tag)
            .collect(),
        _ => Vec::new(),
    }
}

fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.trim();
    let tag = tag.strip_prefix('#').unwrap_or(tag).trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_basic() {
        let (fm, body) = split("---\ntitle: Hi\n---\nbody text").unwrap();
        assert_eq!(fm, "title: Hi");
        assert_eq!(body, "body text");
    }

    #[test]
    fn test_split_none() {
        assert!(split("just a body").is_none());
        assert!(split("").is_none());
    }

    #[test]
    fn test_split_unclosed() {
        assert!(split("---\ntitle: Hi\nno closing fence").is_none());
    }

    #[test]
    fn test_parse_no_frontmatter() {
        let (data, body) = parse("plain body").unwrap();
        assert!(data.tags.is_empty());
        assert!(data.props.is_empty());
        assert_eq!(body, "plain body");
    }

    #[test]
    fn test_parse_tags_list() {
        let (data, _) = parse("---\ntags: ['#work', ' notes ', '']\n---\nx").unwrap();
        assert_eq!(data.tags, vec!["work", "notes"]);
    }

    #[test]
    fn test_parse_tags_string() {
        let (data, _) = parse("---\ntags: \"#a, b  c\"\n---\nx").unwrap();
        assert_eq!(data.tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_tags_list_keeps_only_strings() {
        let (data, _) = parse("---\ntags: [work, 42, true]\n---\nx").unwrap();
        assert_eq!(data.tags, vec!["work"]);
    }

    #[test]
    fn test_parse_missing_tags() {
        let (data, _) = parse("---\ntitle: Hi\n---\nx").unwrap();
        assert!(data.tags.is_empty());
        assert_eq!(data.props.get("title"), Some(&json!("Hi")));
    }

    #[test]
    fn test_parse_raw_props_untouched() {
        let (data, _) = parse("---\ntags: '#work'\nlink_to: https://x.io\n---\nx").unwrap();
        // Raw value stays as written, normalization only affects `tags`
        assert_eq!(data.props.get("tags"), Some(&json!("#work")));
        assert_eq!(data.props.get("link_to"), Some(&json!("https://x.io")));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse("---\n{ not: [valid\n---\nx").is_err());
        assert!(parse("---\n- just\n- a list\n---\nx").is_err());
    }

    #[test]
    fn test_parse_empty_block() {
        let (data, body) = parse("---\n---\nbody").unwrap();
        assert!(data.props.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn test_serialize_empty() {
        let out = serialize(&JsonMap::new(), "body only").unwrap();
        assert_eq!(out, "body only");
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut map = JsonMap::new();
        map.insert("title".into(), json!("Hello"));
        map.insert("date".into(), json!("2024-01-01"));

        let out = serialize(&map, "the body").unwrap();
        let (data, body) = parse(&out).unwrap();
        assert_eq!(data.props.get("title"), Some(&json!("Hello")));
        assert_eq!(body, "the body");

        // Stable bytes on re-serialization
        let again = serialize(&data.props, body).unwrap();
        assert_eq!(out, again);
    }
}
