//! `roost link` command implementation.
//!
//! Stores the registry API key under the user's home directory.

use tracing::info;

use roost_core::error::RoostResult;

use super::CommandContext;
use crate::keyfile;

/// Execute the `roost link` command
pub async fn execute(key: &str, _ctx: &CommandContext) -> RoostResult<()> {
    let path = keyfile::store_api_key(key).await?;
    info!("Successfully updated {} with your key!", path.display());
    Ok(())
}
