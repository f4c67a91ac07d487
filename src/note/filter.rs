//! Required-tag and required-property filters.
//!
//! Config can demand that a note carries certain tags, or certain
//! frontmatter properties with matching values, before it is synced.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::frontmatter::FrontmatterData;
use super::value_display;

/// Required value for a frontmatter property.
///
/// Written in config as `"*"` (any value), a bare string (substring
/// match), or a string array (match any of these substrings).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawRequired")]
pub enum RequiredValue {
    /// Property must exist; any value is acceptable.
    Any,
    /// Property's string form must contain one of these substrings.
    OneOf(Vec<String>),
}

/// Config-file shape of a required value.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRequired {
    One(String),
    Many(Vec<String>),
}

impl From<RawRequired> for RequiredValue {
    fn from(raw: RawRequired) -> Self {
        match raw {
            RawRequired::One(s) if s == "*" => Self::Any,
            RawRequired::One(s) => Self::OneOf(vec![s]),
            RawRequired::Many(list) => Self::OneOf(list),
        }
    }
}

impl RequiredValue {
    /// Whether a present property value satisfies this requirement.
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            Self::Any => true,
            Self::OneOf(subs) => {
                let actual = value_display(value);
                subs.iter().any(|sub| actual.contains(sub.as_str()))
            }
        }
    }
}

/// Required properties keyed by name, as merged from config.
pub type RequiredProps = BTreeMap<String, RequiredValue>;

/// Whether a note passes the configured tag and property requirements.
///
/// All required tags must be present, and every required property must
/// exist with a matching value. Absent property means no match.
pub fn has_required_fields(
    frontmatter: &FrontmatterData,
    require_tags: &[String],
    require_props: &RequiredProps,
) -> bool {
    if !require_tags
        .iter()
        .all(|tag| frontmatter.tags.iter().any(|t| t == tag))
    {
        return false;
    }

    require_props.iter().all(|(name, required)| {
        frontmatter
            .props
            .get(name)
            .is_some_and(|value| required.matches(value))
    })
}
