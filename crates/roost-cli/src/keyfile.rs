//! API key storage.
//!
//! The key lives in a single file under the user's home directory; `link`
//! writes it, `publish` reads it back.

use std::path::PathBuf;

use roost_core::error::{RoostError, RoostResult};

const KEY_FILE: &str = ".roost-api-key";

fn key_path() -> RoostResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(KEY_FILE))
        .ok_or_else(|| RoostError::ConfigValidation {
            field: "home".to_string(),
            reason: "could not determine the home directory".to_string(),
        })
}

/// Store the API key, returning the file it was written to
pub async fn store_api_key(key: &str) -> RoostResult<PathBuf> {
    let path = key_path()?;
    tokio::fs::write(&path, key)
        .await
        .map_err(|e| RoostError::io(format!("failed to write {}", path.display()), e))?;
    Ok(path)
}

/// Read the stored API key, `None` when no key has been linked yet
pub async fn read_api_key() -> RoostResult<Option<String>> {
    let path = key_path()?;
    match tokio::fs::read_to_string(&path).await {
        Ok(key) => Ok(Some(key.trim().to_string())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(RoostError::io(
            format!("failed to read {}", path.display()),
            err,
        )),
    }
}
