//! User identity detection and sanitization.
//!
//! The identity is the per-contributor suffix appended to output
//! filenames. Detection order: configured `user_id`, the `MDSYNC_USER`
//! environment variable, then the local part of `user.email` in the
//! global git config.

use std::sync::LazyLock;

use regex::Regex;

use super::ConfigError;

/// Env var consulted when no `user_id` is configured.
pub const USER_ENV: &str = "MDSYNC_USER";

static EMAIL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*email\s*=\s*(.+)$").expect("valid regex"));

/// Resolve the user id, sanitized for filename use.
pub fn detect_user_id(configured: Option<&str>) -> Result<String, ConfigError> {
    if let Some(id) = configured {
        let id = sanitize_user_id(id);
        if !id.is_empty() {
            return Ok(id);
        }
    }

    if let Ok(env_id) = std::env::var(USER_ENV) {
        let id = sanitize_user_id(&env_id);
        if !id.is_empty() {
            return Ok(id);
        }
    }

    if let Some(email) = gitconfig_email()
        && let Some(local) = email.split('@').next()
    {
        let id = sanitize_user_id(local);
        if !id.is_empty() {
            return Ok(id);
        }
    }

    Err(ConfigError::NoIdentity)
}

/// Lowercase, collapse anything but ascii alphanumerics into single
/// dashes, trim dashes from the ends.
pub fn sanitize_user_id(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// First `email = ...` entry in `~/.gitconfig`, if any.
fn gitconfig_email() -> Option<String> {
    let path = dirs::home_dir()?.join(".gitconfig");
    let content = std::fs::read_to_string(path).ok()?;
    parse_email(&content)
}

fn parse_email(gitconfig: &str) -> Option<String> {
    EMAIL_LINE
        .captures(gitconfig)
        .map(|caps| caps[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_user_id("alice"), "alice");
        assert_eq!(sanitize_user_id("Alice.Smith@X"), "alice-smith-x");
        assert_eq!(sanitize_user_id("--bob--"), "bob");
        assert_eq!(sanitize_user_id("a__b  c"), "a-b-c");
        assert_eq!(sanitize_user_id("!!!"), "");
    }

    #[test]
    fn test_parse_email() {
        let gitconfig = "[user]\n\tname = Alice\n\temail = alice@example.com\n";
        assert_eq!(parse_email(gitconfig), Some("alice@example.com".into()));
        assert_eq!(parse_email("[core]\n\tautocrlf = false\n"), None);
    }

    #[test]
    fn test_configured_id_wins() {
        assert_eq!(detect_user_id(Some("Bob Jones")).unwrap(), "bob-jones");
    }

    #[test]
    fn test_unusable_configured_id_falls_through() {
        // "***" sanitizes to nothing; detection continues down the
        // chain instead of producing an empty identity.
        let result = detect_user_id(Some("***"));
        if let Ok(id) = result {
            assert!(!id.is_empty());
        }
    }
}
