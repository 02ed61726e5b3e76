//! `roost init` command implementation.
//!
//! Writes a fresh module configuration into the working directory.

use tracing::info;

use roost_config::{default_config, write_config, Config, ConfigFormat};
use roost_core::error::{RoostError, RoostResult};

use super::CommandContext;

/// Execute the `roost init` command
pub async fn execute(
    name: Option<String>,
    description: Option<String>,
    entry: String,
    format: ConfigFormat,
    force: bool,
    ctx: &CommandContext,
) -> RoostResult<()> {
    if let Some(existing) = default_config(&ctx.cwd) {
        if !force {
            return Err(RoostError::ConfigValidation {
                field: "config".to_string(),
                reason: format!(
                    "{} already exists (pass --force to overwrite it)",
                    existing.display()
                ),
            });
        }
    }

    let name = name.unwrap_or_else(|| directory_name(ctx));
    let config = Config {
        name: Some(name),
        description,
        entry: Some(entry),
        ..Default::default()
    };

    let path = write_config(&ctx.cwd, &config, format).await?;
    info!("Created {}", path.display());
    Ok(())
}

fn directory_name(ctx: &CommandContext) -> String {
    ctx.cwd
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "module".to_string())
}
