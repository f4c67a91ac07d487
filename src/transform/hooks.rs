//! Pluggable value-rewriting hooks.
//!
//! A hook is a strategy with the fixed signature `(value, context) ->
//! value`. The context carries only the current file path and its raw
//! frontmatter map. Hook failures are per-file errors; they never
//! abort the run.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Result, bail};
use rustc_hash::FxHashMap;

use crate::config::HookCommands;
use crate::note::JsonMap;

/// Context handed to every hook invocation.
pub struct HookContext<'a> {
    /// Absolute path of the note being transformed.
    pub file_path: &'a Path,
    /// The note's raw frontmatter map.
    pub frontmatter: &'a JsonMap,
}

/// A value rewriter plugged into the transformation pipeline.
pub trait TransformHook: Send + Sync {
    /// Name used in error messages.
    fn name(&self) -> &str;

    /// Rewrite `value`; an error is recorded against the current file.
    fn apply(&self, value: &str, ctx: &HookContext<'_>) -> Result<String>;
}

// ============================================================================
// CommandHook
// ============================================================================

/// Hook that pipes the value through an external command.
///
/// The value arrives on stdin; the rewritten value is read from stdout
/// with one trailing newline stripped. The command sees the context as
/// `$MDSYNC_FILE` and `$MDSYNC_FRONTMATTER` (JSON) environment
/// variables. A non-zero exit status is a hook failure.
pub struct CommandHook {
    name: String,
    command: Vec<String>,
}

impl CommandHook {
    pub fn new(name: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command,
        }
    }
}

impl TransformHook for CommandHook {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, value: &str, ctx: &HookContext<'_>) -> Result<String> {
        let Some((program, args)) = self.command.split_first() else {
            bail!("empty hook command");
        };

        let frontmatter = serde_json::to_string(ctx.frontmatter)?;

        let mut child = Command::new(program)
            .args(args)
            .env("MDSYNC_FILE", ctx.file_path)
            .env("MDSYNC_FRONTMATTER", frontmatter)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(value.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("`{program}` exited with {}: {}", output.status, stderr.trim());
        }

        let mut rewritten = String::from_utf8_lossy(&output.stdout).into_owned();
        if rewritten.ends_with('\n') {
            rewritten.pop();
        }
        Ok(rewritten)
    }
}

// ============================================================================
// HookSet
// ============================================================================

/// The hooks active for one sync configuration.
#[derive(Default)]
pub struct HookSet {
    property: FxHashMap<String, Box<dyn TransformHook>>,
    content: Option<Box<dyn TransformHook>>,
    filename: Option<Box<dyn TransformHook>>,
}

impl HookSet {
    /// Build command hooks from the `[transform.hooks]` config section.
    pub fn from_commands(commands: &HookCommands) -> Self {
        let mut set = Self::default();

        for (prop, command) in &commands.property {
            if !command.is_empty() {
                set.set_property(
                    prop,
                    CommandHook::new(format!("property:{prop}"), command.clone()),
                );
            }
        }
        if let Some(command) = &commands.content
            && !command.is_empty()
        {
            set.set_content(CommandHook::new("content", command.clone()));
        }
        if let Some(command) = &commands.filename
            && !command.is_empty()
        {
            set.set_filename(CommandHook::new("filename", command.clone()));
        }

        set
    }

    pub fn set_property(&mut self, prop: impl Into<String>, hook: impl TransformHook + 'static) {
        self.property.insert(prop.into(), Box::new(hook));
    }

    pub fn set_content(&mut self, hook: impl TransformHook + 'static) {
        self.content = Some(Box::new(hook));
    }

    pub fn set_filename(&mut self, hook: impl TransformHook + 'static) {
        self.filename = Some(Box::new(hook));
    }

    pub fn property(&self, prop: &str) -> Option<&dyn TransformHook> {
        self.property.get(prop).map(|hook| &**hook)
    }

    pub fn content(&self) -> Option<&dyn TransformHook> {
        self.content.as_deref()
    }

    pub fn filename(&self) -> Option<&dyn TransformHook> {
        self.filename.as_deref()
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("property", &self.property.keys().collect::<Vec<_>>())
            .field("content", &self.content.is_some())
            .field("filename", &self.filename.is_some())
            .finish()
    }
}
