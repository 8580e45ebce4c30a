//! CLI help and command-name contract for logging and routing.

use crate::cli::parse::{ClusterCommands, Commands, HotbarCommands};

/// Command name string for logs (e.g. "cluster.delete", "hotbar.pin").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Cluster { command } => format!("cluster.{}", cluster_command_name(command)),
        Commands::Contexts { .. } => "contexts".to_string(),
        Commands::Hotbar { command } => format!("hotbar.{}", hotbar_command_name(command)),
    }
}

pub fn cluster_command_name(command: &ClusterCommands) -> &'static str {
    match command {
        ClusterCommands::Add { .. } => "add",
        ClusterCommands::List { .. } => "list",
        ClusterCommands::Delete { .. } => "delete",
    }
}

pub fn hotbar_command_name(command: &HotbarCommands) -> &'static str {
    match command {
        HotbarCommands::Pin { .. } => "pin",
        HotbarCommands::Unpin { .. } => "unpin",
        HotbarCommands::List { .. } => "list",
    }
}
