//! CLI parse: clap types for clusterdeck. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// clusterdeck CLI - manage kubeconfig contexts as named clusters
#[derive(Parser)]
#[command(name = "clusterdeck")]
#[command(about = "Register, pin and safely delete kubeconfig contexts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable logging entirely
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Log at debug level and mirror logs to stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage registered clusters
    Cluster {
        #[command(subcommand)]
        command: ClusterCommands,
    },
    /// List the contexts of a kubeconfig file
    Contexts {
        /// Kubeconfig file
        path: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Manage hotbar pins
    Hotbar {
        #[command(subcommand)]
        command: HotbarCommands,
    },
}

#[derive(Subcommand)]
pub enum ClusterCommands {
    /// Register a context from a kubeconfig file
    Add {
        /// Kubeconfig file
        kubeconfig: PathBuf,
        /// Context name inside the file
        #[arg(long)]
        context: String,
    },
    /// List registered clusters
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Delete a cluster's context from its kubeconfig
    Delete {
        /// Cluster id
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
        /// New current context if the deleted one is current
        #[arg(long, conflicts_with = "unset_current_context")]
        current_context: Option<String>,
        /// Clear current-context if the deleted one is current
        #[arg(long)]
        unset_current_context: bool,
    },
}

#[derive(Subcommand)]
pub enum HotbarCommands {
    /// Pin a cluster to a hotbar
    Pin {
        /// Cluster id
        id: String,
        #[arg(long, default_value = crate::hotbar::DEFAULT_HOTBAR)]
        hotbar: String,
    },
    /// Remove a cluster from a hotbar
    Unpin {
        /// Cluster id
        id: String,
        #[arg(long, default_value = crate::hotbar::DEFAULT_HOTBAR)]
        hotbar: String,
    },
    /// Show hotbar pins
    List {
        /// Only this hotbar
        #[arg(long)]
        hotbar: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
