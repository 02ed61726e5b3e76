//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking a [`CommandContext`].

use std::path::PathBuf;

use tracing::info;

use roost_core::error::RoostResult;

use crate::Commands;

pub mod info;
pub mod init;
pub mod link;
pub mod publish;

#[cfg(test)]
mod tests;

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: PathBuf,
}

impl CommandContext {
    /// Create a new command context
    pub fn new() -> RoostResult<Self> {
        let cwd = std::env::current_dir().map_err(|e| {
            roost_core::error::RoostError::io("failed to get current directory".to_string(), e)
        })?;
        Ok(Self { cwd })
    }
}

/// Dispatch a command to its handler
pub async fn dispatch(command: Commands, ctx: &CommandContext) -> RoostResult<()> {
    match command {
        Commands::Info { file, full, raw } => {
            info!("Resolving dependency tree of {file}");
            info::execute(&file, full, raw, ctx).await
        },
        Commands::Init {
            name,
            description,
            entry,
            format,
            force,
        } => {
            info!("Initializing module configuration");
            init::execute(name, description, entry, format.into(), force, ctx).await
        },
        Commands::Link { key } => link::execute(&key, ctx).await,
        Commands::Publish {
            name,
            dry_run,
            version,
            description,
            repository,
            entry,
            unstable,
            unlisted,
            no_latest,
        } => {
            info!("Publishing module (dry run: {dry_run})");
            publish::execute(
                publish::PublishFlags {
                    name,
                    dry_run,
                    version,
                    description,
                    repository,
                    entry,
                    unstable,
                    unlisted,
                    no_latest,
                },
                ctx,
            )
            .await
        },
    }
}
