//! SessionStart handler.
//!
//! Runs once when an agent session starts. Activation is skipped silently
//! when uv isn't installed, and with a warning when the runtime provided no
//! session environment file.
//!
//! ## Usage
//!
//! ```bash
//! CLAUDE_ENV_FILE=/path/to/session.env shim-hook session-start
//! ```

use crate::HookError;
use shim_core::config::ENV_FILE_ENV;
use shim_core::{InstallOutcome, SearchPath, SessionInstaller, ShimDirSpec};
use std::env;
use std::path::PathBuf;

pub fn run(requested: Option<PathBuf>) -> Result<(), HookError> {
    let env_file = env::var_os(ENV_FILE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);

    let shim_dir = ShimDirSpec {
        anchor: crate::hook_dir()?,
        requested,
    };
    let installer = SessionInstaller::new(SearchPath::from_env(), env_file, shim_dir);

    match installer.run()? {
        InstallOutcome::Activated { shim_dir, .. } => {
            tracing::debug!(shim_dir = %shim_dir.display(), "session-start complete");
        }
        InstallOutcome::UvMissing => {}
        InstallOutcome::EnvFileUnset => {
            eprintln!(
                "shim-hook: warning: {ENV_FILE_ENV} is not set; legacy tooling shims not activated"
            );
        }
    }
    Ok(())
}
