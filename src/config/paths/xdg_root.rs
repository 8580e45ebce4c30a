//! XDG Base Directory utilities.

use crate::error::ApiError;
use std::path::PathBuf;

/// Directory name used under the XDG config and data homes.
pub const APP_DIR: &str = "clusterdeck";

/// Get XDG data home directory
///
/// Returns `$XDG_DATA_HOME` if set, otherwise defaults to `$HOME/.local/share`
pub fn data_home() -> Option<PathBuf> {
    if let Some(dir) = non_empty_env("XDG_DATA_HOME") {
        return Some(dir);
    }
    non_empty_env("HOME").map(|home| home.join(".local").join("share"))
}

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
pub fn config_home() -> Result<PathBuf, ApiError> {
    if let Some(dir) = non_empty_env("XDG_CONFIG_HOME") {
        return Ok(dir);
    }
    non_empty_env("HOME")
        .map(|home| home.join(".config"))
        .ok_or_else(|| {
            ApiError::ConfigError(
                "Could not determine XDG config home directory (HOME not set)".to_string(),
            )
        })
}

/// `$XDG_DATA_HOME/clusterdeck`
pub fn app_data_dir() -> Result<PathBuf, ApiError> {
    data_home().map(|home| home.join(APP_DIR)).ok_or_else(|| {
        ApiError::ConfigError(
            "Could not determine XDG data home directory (HOME not set)".to_string(),
        )
    })
}

fn non_empty_env(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
