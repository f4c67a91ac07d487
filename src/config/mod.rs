//! Sync configuration: loading, merging and validation.
//!
//! Two TOML layers are merged:
//!
//! | File               | Location                | Purpose                     |
//! |--------------------|-------------------------|-----------------------------|
//! | `mdsync.toml`      | repo root (committed)   | output dir, routes, filters |
//! | `mdsync.user.toml` | repo root, then `$HOME` | source dir, identity        |
//!
//! Repo values win for routes, exclusions, filters and transformation
//! settings when both layers define them; the user layer supplies the
//! source directory and identity. Link overrides merge with repo
//! entries taking precedence.

pub mod error;
pub mod identity;
mod route;
mod transform;

pub use error::ConfigError;
pub use route::Route;
pub use transform::{HookCommands, TransformConfig, WikilinkBehavior};

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::note::filter::RequiredProps;
use crate::transform::hooks::HookSet;
use crate::utils::glob::compile_glob;

/// Repo-level config file name (committed to version control).
pub const REPO_CONFIG_FILE: &str = "mdsync.toml";
/// User-level config file name (not committed).
pub const USER_CONFIG_FILE: &str = "mdsync.user.toml";

// ============================================================================
// File-level layers
// ============================================================================

/// Shape of `mdsync.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RepoFileConfig {
    /// Output directory relative to the repo root.
    output: Option<String>,
    #[serde(rename = "route")]
    routes: Vec<Route>,
    exclude: Option<Vec<String>>,
    require_tags: Option<Vec<String>>,
    require_props: Option<RequiredProps>,
    transform: TransformConfig,
}

impl RepoFileConfig {
    /// Defaults used when no repo config file exists: everything into
    /// `notes/`, one catch-all route.
    fn fallback() -> Self {
        Self {
            output: Some("notes".to_string()),
            routes: vec![Route {
                source_path: Some("**/*.md".to_string()),
                tag: None,
                output: ".".to_string(),
            }],
            ..Self::default()
        }
    }
}

/// Shape of `mdsync.user.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct UserFileConfig {
    user_id: Option<String>,
    /// Source directory containing the markdown notes.
    source: Option<PathBuf>,
    /// Append the identity suffix to output names (default true).
    multi_user: Option<bool>,
    #[serde(rename = "route")]
    routes: Vec<Route>,
    exclude: Option<Vec<String>>,
    require_tags: Option<Vec<String>>,
    require_props: Option<RequiredProps>,
    transform: TransformConfig,
}

// ============================================================================
// Merged configuration
// ============================================================================

/// Fully merged configuration, the explicit argument of every public
/// sync operation. Nothing derived from it is memoized across calls.
#[derive(Debug, Default)]
pub struct SyncConfig {
    /// Repo root (parent of `mdsync.toml`).
    pub root: PathBuf,
    /// Sanitized per-contributor identity suffix.
    pub user_id: String,
    /// Whether output names carry the identity suffix.
    pub multi_user: bool,
    /// Absolute source directory.
    pub source_dir: PathBuf,
    /// Absolute output root.
    pub output_dir: PathBuf,
    /// Ordered routing rules, first match wins.
    pub routes: Vec<Route>,
    /// Exclusion globs over source-relative paths.
    pub exclude: Vec<String>,
    /// Tags a note must all carry to be synced.
    pub require_tags: Vec<String>,
    /// Properties a note must carry with matching values.
    pub require_props: RequiredProps,
    /// Transformation settings.
    pub transform: TransformConfig,
    /// Pluggable value-rewriting hooks, built from `transform.hooks`
    /// commands; library callers may replace them programmatically.
    pub hooks: HookSet,
}

impl SyncConfig {
    /// Load, merge and validate configuration for a CLI invocation.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let root = match &cli.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()
                .map_err(|e| ConfigError::Io(PathBuf::from("."), e))?,
        };

        let repo = match read_toml::<RepoFileConfig>(&root.join(REPO_CONFIG_FILE))? {
            Some(repo) => repo,
            None => RepoFileConfig::fallback(),
        };

        let user = load_user_config(&root)?;

        let config = Self::merge(root, repo, user)?;
        config.validate()?;
        Ok(config)
    }

    fn merge(
        root: PathBuf,
        repo: RepoFileConfig,
        user: UserFileConfig,
    ) -> Result<Self, ConfigError> {
        let user_id = identity::detect_user_id(user.user_id.as_deref())?;

        let source = user.source.ok_or_else(|| {
            ConfigError::Validation(format!(
                "source directory not configured; set `source` in {USER_CONFIG_FILE}"
            ))
        })?;
        let source_dir = if source.is_absolute() {
            source
        } else {
            root.join(source)
        };

        let output_dir = root.join(repo.output.as_deref().unwrap_or("notes"));

        let routes = if repo.routes.is_empty() {
            user.routes
        } else {
            repo.routes
        };

        let transform = TransformConfig::merged(repo.transform, user.transform);
        let hooks = HookSet::from_commands(&transform.hooks);

        Ok(Self {
            root,
            user_id,
            multi_user: user.multi_user.unwrap_or(true),
            source_dir,
            output_dir,
            routes,
            exclude: repo.exclude.or(user.exclude).unwrap_or_default(),
            require_tags: repo.require_tags.or(user.require_tags).unwrap_or_default(),
            require_props: repo.require_props.or(user.require_props).unwrap_or_default(),
            transform,
            hooks,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !self.source_dir.is_dir() {
            errors.push(format!(
                "source directory not readable: {}",
                self.source_dir.display()
            ));
        }

        if let Err(e) = fs::create_dir_all(&self.output_dir) {
            errors.push(format!(
                "output directory not writable and cannot be created: {} ({e})",
                self.output_dir.display()
            ));
        }

        if self.routes.is_empty() {
            errors.push("at least one route is required".to_string());
        }

        for route in &self.routes {
            if route.output.is_empty() {
                errors.push("each route must specify a non-empty `output`".to_string());
            }
            if !route.has_condition() {
                errors.push(format!(
                    "route to `{}` must specify `source_path`, `tag`, or both",
                    route.output
                ));
            }
            if let Some(pattern) = &route.source_path
                && let Err(e) = compile_glob(pattern)
            {
                errors.push(format!("invalid route glob `{pattern}`: {e}"));
            }
        }

        for pattern in &self.exclude {
            if let Err(e) = compile_glob(pattern) {
                errors.push(format!("invalid exclude glob `{pattern}`: {e}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(format!(
                "\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

// ============================================================================
// File reading
// ============================================================================

/// Read and parse a TOML file; `None` when it does not exist.
fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
    };

    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::Toml(path.to_path_buf(), e))
}

/// User config from the repo root, falling back to the home directory.
fn load_user_config(root: &Path) -> Result<UserFileConfig, ConfigError> {
    if let Some(user) = read_toml(&root.join(USER_CONFIG_FILE))? {
        return Ok(user);
    }

    if let Some(home) = dirs::home_dir()
        && let Some(user) = read_toml(&home.join(USER_CONFIG_FILE))?
    {
        return Ok(user);
    }

    Ok(UserFileConfig::default())
}
