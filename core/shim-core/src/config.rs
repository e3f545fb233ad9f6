//! Configuration loading for the shims and the session hook.
//!
//! Handles:
//! - Environment variable names shared by the hook and the shims
//! - The optional JSON config file (~/.claude/legacy-shims.json)
//!
//! A missing or malformed config file yields defaults; a shim must never fail
//! because of its own configuration. Nothing here can make the `python`,
//! `pip` or `pipx` shims pass through: the escape hatch is putting another
//! directory ahead of the shims on `PATH`.

use crate::EXIT_DELEGATE_NOT_FOUND;
use fs_err as fs;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Session environment file supplied by the hosting runtime.
pub const ENV_FILE_ENV: &str = "CLAUDE_ENV_FILE";
/// Overrides the shim directory the session hook activates.
pub const SHIM_DIR_ENV: &str = "LEGACY_SHIMS_DIR";
/// `EnvFilter` directives for the log file.
pub const LOG_FILTER_ENV: &str = "LEGACY_SHIMS_LOG";
/// When truthy, forces debug-level logging.
pub const DEBUG_LOG_ENV: &str = "LEGACY_SHIMS_DEBUG_LOG";

const CONFIG_FILE: &str = "legacy-shims.json";
const DEFAULT_BLOCKED_EXIT_CODE: u8 = 1;

/// Returns the path to the Claude directory (~/.claude).
pub fn get_claude_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claude"))
}

/// Returns the path to the shim configuration file.
pub fn get_config_path() -> Option<PathBuf> {
    get_claude_dir().map(|d| d.join(CONFIG_FILE))
}

/// Persistent shim settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShimConfig {
    /// Exit status for blocked invocations.
    pub blocked_exit_code: u8,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            blocked_exit_code: DEFAULT_BLOCKED_EXIT_CODE,
        }
    }
}

impl ShimConfig {
    /// Loads ~/.claude/legacy-shims.json, or defaults.
    pub fn load() -> Self {
        get_config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Loads from an explicit path, returning defaults if missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Ignoring malformed shim config");
                Self::default()
            }
        }
    }

    /// Exit code for blocked invocations. 0 and 127 are reserved, so a
    /// configured value of either falls back to 1.
    pub fn blocked_exit_code(&self) -> u8 {
        match self.blocked_exit_code {
            0 | EXIT_DELEGATE_NOT_FOUND => DEFAULT_BLOCKED_EXIT_CODE,
            code => code,
        }
    }
}

/// Explicit shim directory from `LEGACY_SHIMS_DIR`; empty counts as unset.
pub fn shim_dir_override() -> Option<PathBuf> {
    env::var_os(SHIM_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Reads a boolean-ish environment flag ("1", "true", "yes").
pub fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}
