//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Hierarchical connection tree: inspect and reorder connection layouts
#[derive(Parser, Debug)]
#[command(name = "conntree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Raise log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short = 'c', long = "config", global = true, value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a layout as a tree
    Show {
        /// Layout file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        layout: PathBuf,
    },

    /// Build a layout and audit the resulting tree
    Check {
        /// Layout file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        layout: PathBuf,
    },

    /// Render a layout with every container sorted by name
    Sort {
        /// Layout file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        layout: PathBuf,

        /// Sort Z to A
        #[arg(long)]
        descending: bool,
    },

    /// Print the path of every node with the given name
    Find {
        /// Layout file (TOML)
        #[arg(value_hint = ValueHint::FilePath)]
        layout: PathBuf,

        /// Exact node name
        name: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,

    /// Show the global config file location
    Path,
}
