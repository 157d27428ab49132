//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use mirror_core::MarkdownMode;

/// docmirror - Mirror per-package documentation into one central tree
#[derive(Parser, Debug)]
#[command(name = "docmirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root (defaults to the nearest ancestor holding docmirror.toml)
    #[arg(long, global = true, env = "DOCMIRROR_ROOT")]
    pub root: Option<PathBuf>,

    /// Packages root, relative to the workspace root
    #[arg(long, global = true)]
    pub packages_root: Option<String>,

    /// Output root, relative to the workspace root
    #[arg(long, global = true)]
    pub output_root: Option<String>,

    /// How source documents that are not valid UTF-8 are handled
    #[arg(long, global = true, value_enum)]
    pub markdown_mode: Option<ModeArg>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Markdown decoding mode as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Fail on non-UTF-8 sources
    Strict,
    /// Decode non-UTF-8 sources with replacement characters
    Lossy,
}

impl From<ModeArg> for MarkdownMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strict => MarkdownMode::Strict,
            ModeArg::Lossy => MarkdownMode::Lossy,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List publishable packages
    Packages {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the docs map as JSON
    Map,

    /// Write the mirror and prune stale generated files
    ///
    /// Examples:
    ///   docmirror sync                 # Mirror packages/ into docs/packages/
    ///   docmirror sync --dry-run       # Show what would change
    ///   docmirror --output-root site sync
    Sync {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Check the mirror for drift; exits non-zero when it is out of date
    Check {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Render the mirrored docs into one corpus document
    Corpus {
        /// Docs map JSON to render instead of generating one
        #[arg(long)]
        map: Option<PathBuf>,

        /// Write the corpus to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
