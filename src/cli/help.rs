//! CLI command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string recorded on the command span (e.g. "cp", "ls").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Init { .. } => "init",
        Commands::Ls { .. } => "ls",
        Commands::Mkdir { .. } => "mkdir",
        Commands::Cp { .. } => "cp",
        Commands::Rm { .. } => "rm",
        Commands::Put { .. } => "put",
        Commands::Get { .. } => "get",
        Commands::Ln { .. } => "ln",
        Commands::Config { .. } => "config",
    }
}

/// Whether the command acts on the namespace and so needs a configured user.
pub fn needs_user(command: &Commands) -> bool {
    !matches!(command, Commands::Init { .. } | Commands::Config { .. })
}
