//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// mdsync multi-contributor note sync CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Repository root containing mdsync.toml (default: current directory)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sync notes into the shared output tree
    #[command(visible_alias = "s")]
    Sync {
        /// List every unresolved wikilink after the run
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show what a sync would copy and delete, without writing
    #[command(visible_alias = "st")]
    Status,

    /// List source files and the routes they match
    Scan,

    /// Delete every output file belonging to the current user
    Clean,
}

#[allow(unused)]
impl Cli {
    pub const fn is_sync(&self) -> bool {
        matches!(self.command, Commands::Sync { .. })
    }
    pub const fn is_status(&self) -> bool {
        matches!(self.command, Commands::Status)
    }
    pub const fn is_clean(&self) -> bool {
        matches!(self.command, Commands::Clean)
    }
}
