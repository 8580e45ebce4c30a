//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, ClusterCommands, Commands, HotbarCommands};
pub use presentation::{
    format_cluster_list, format_contexts, format_deletion_report, format_hotbars,
};
pub use route::RunContext;
