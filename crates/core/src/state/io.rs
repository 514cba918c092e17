//! # IO Utilities
//!
//! File system operations for the `.pitch-battle` runtime directory.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

/// Environment variable overriding the runtime directory
pub const RUNTIME_PATH_ENV: &str = "PITCH_BATTLE_RUNTIME_PATH";

/// Get the runtime directory path (.pitch-battle)
pub fn get_runtime_path() -> PathBuf {
    if let Ok(path) = std::env::var(RUNTIME_PATH_ENV) {
        return PathBuf::from(path);
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".pitch-battle")
}

/// Ensure the runtime directory exists
pub async fn ensure_runtime_dir() -> Result<PathBuf> {
    let path = get_runtime_path();
    fs::create_dir_all(&path)
        .await
        .with_context(|| format!("Failed to create runtime directory: {:?}", path))?;
    Ok(path)
}

/// `config.json` inside the runtime directory
pub fn config_path() -> PathBuf {
    get_runtime_path().join("config.json")
}

/// `.env` inside the runtime directory
pub fn env_path() -> PathBuf {
    get_runtime_path().join(".env")
}
