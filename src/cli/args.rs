use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Scour — a selection-driven, preview-first cleanup utility
#[derive(Parser, Debug)]
#[command(
    name = "scour",
    version,
    about = "Select cleanup operations, preview them, then clean",
    after_help = "EXAMPLES:\n  \
        scour list                         Show operations and selection state\n  \
        scour list --all                   Include auto-hidden operations\n  \
        scour select cache                 Select an operation and all its options\n  \
        scour select cache temp_files      Select a single option\n  \
        scour deselect cache logs          Deselect a single option\n  \
        scour preview                      Dry run over the selection\n  \
        scour clean                        Delete, asking for confirmation\n  \
        scour clean --yes --json           Delete without prompting, JSON summary\n  \
        scour config set auto_hide false   Change a persisted setting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Catalog file (TOML); defaults to <data dir>/catalog.toml
    #[arg(long, global = true, value_name = "PATH", env = "SCOUR_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit run summaries as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the selection tree
    List {
        /// Include operations hidden by auto-hide
        #[arg(long)]
        all: bool,
    },

    /// Check an operation, or one of its options
    Select {
        operation: String,
        option: Option<String>,
    },

    /// Uncheck an operation, or one of its options
    Deselect {
        operation: String,
        option: Option<String>,
    },

    /// Dry run: report what would be removed, touch nothing
    Preview,

    /// Remove the selected items
    Clean {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        /// Allow catalog paths outside the home directory
        #[arg(long)]
        allow_outside_home: bool,
    },

    /// Show or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print current settings
    Show,
    /// Set a setting (delete_confirmation, auto_hide)
    Set { key: String, value: String },
}
