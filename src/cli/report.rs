//! Command handlers: drive the sync engine and render its results.

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::SyncConfig;
use crate::log;
use crate::sync;
use crate::utils::{plural_count, plural_s};

/// Run a full sync and report counts, warnings and per-file errors.
pub fn run_sync(config: &SyncConfig, verbose: bool) -> Result<()> {
    let result = sync::sync(config, verbose)?;

    log!("sync";
        "copied {}, deleted {}",
        plural_count(result.copied, "note"),
        plural_count(result.deleted, "orphan")
    );
    if result.files_copied > 0 {
        log!("sync"; "copied {} into _files/", plural_count(result.files_copied, "embedded asset"));
    }

    if result.unresolved_count > 0 {
        if verbose {
            for link in &result.unresolved {
                log!("warn"; "unresolved {} in {}", link.wikilink, link.file_path);
            }
        } else {
            log!("warn";
                "{} unresolved wikilink{} (use --verbose to list them)",
                result.unresolved_count,
                plural_s(result.unresolved_count)
            );
        }
    }

    for error in &result.errors {
        log!("error"; "{error}");
    }

    Ok(())
}

/// Dry run: show what a sync would do.
pub fn run_status(config: &SyncConfig) -> Result<()> {
    let status = sync::status(config)?;

    log!("status"; "{} to copy", plural_count(status.to_copy.len(), "note"));
    for file in &status.to_copy {
        println!(
            "  {} {} {}",
            file.relative_path,
            "->".dimmed(),
            file.output_path.display()
        );
    }

    if !status.to_delete.is_empty() {
        log!("status"; "{} to delete", plural_count(status.to_delete.len(), "orphan"));
        for path in &status.to_delete {
            println!("  {}", path.display().to_string().red());
        }
    }

    if !status.collisions.is_empty() {
        log!("error";
            "{} would collide with other contributors:",
            plural_count(status.collisions.len(), "destination")
        );
        for path in &status.collisions {
            println!("  {}", path.display().to_string().red().bold());
        }
    }

    Ok(())
}

/// List source files and their matched routes.
pub fn run_scan(config: &SyncConfig) -> Result<()> {
    let files = sync::scan(config)?;

    log!("scan"; "{} matched", plural_count(files.len(), "note"));
    for file in &files {
        let route = file
            .route
            .source_path
            .as_deref()
            .or(file.route.tag.as_deref())
            .unwrap_or("?");
        println!(
            "  {} {} {} ({})",
            file.relative_path,
            "->".dimmed(),
            file.route.output,
            route.dimmed()
        );
    }

    Ok(())
}

/// Delete all of the current identity's output.
pub fn run_clean(config: &SyncConfig) -> Result<()> {
    let deleted = sync::clean(config);
    log!("clean"; "deleted {} for `{}`", plural_count(deleted, "note"), config.user_id);
    Ok(())
}
