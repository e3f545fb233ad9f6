//! shim-hook: session hook for the legacy Python tooling shims.
//!
//! Called by Claude Code's SessionStart hook (configured in
//! ~/.claude/settings.json) to put the shim directory on PATH for the rest of
//! the session.
//!
//! ## Subcommands
//!
//! - `session-start`: Activate the shims via the session environment file
//! - `link`: Populate a shim directory with links to `legacy-shim`
//! - `explain`: Show how a command line would be handled, without running it

mod explain;
mod link;
mod session_start;

use clap::{Parser, Subcommand};
use shim_core::config::SHIM_DIR_ENV;
use shim_core::installer::{DEFAULT_SHIM_DIR, SHIM_BINARY};
use shim_core::{logging, ShimError};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "shim-hook")]
#[command(about = "Redirects legacy Python tooling to uv")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activate shims for this session (SessionStart hook)
    SessionStart {
        /// Shim directory; relative paths resolve against this binary's directory
        #[arg(long, env = SHIM_DIR_ENV, value_name = "DIR")]
        shim_dir: Option<PathBuf>,
    },

    /// Create the shim links (python, python3, pip, pip3, pipx, uv)
    Link {
        /// Target directory (default: `shims` next to this binary)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },

    /// Show how a command would be handled, without running anything
    Explain {
        /// Shim name (python, python3, pip, pip3, pipx, uv)
        #[arg(value_name = "COMMAND")]
        command: String,

        /// Arguments as they would be typed
        #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Error, Debug)]
pub enum HookError {
    #[error("Cannot locate the shim-hook binary: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error("{0} is not a shim name (expected python, python3, pip, pip3, pipx or uv)")]
    UnknownShim(String),

    #[error("Shim binary not found at {0}")]
    ShimBinaryMissing(PathBuf),

    #[error(transparent)]
    Shim(#[from] ShimError),
}

fn main() -> ExitCode {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::SessionStart { shim_dir } => session_start::run(shim_dir),
        Commands::Link { dir } => link::run(dir),
        Commands::Explain { command, args } => explain::run(&command, &args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "shim-hook failed");
            eprintln!("shim-hook: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Canonical directory holding this binary. Relative shim paths resolve
/// against it, never against the working directory.
pub fn hook_dir() -> Result<PathBuf, HookError> {
    let exe = std::env::current_exe().map_err(HookError::CurrentExe)?;
    let exe = exe.canonicalize().map_err(HookError::CurrentExe)?;
    exe.parent()
        .map(PathBuf::from)
        .ok_or_else(|| HookError::CurrentExe(std::io::Error::other("binary has no parent")))
}

/// The `legacy-shim` binary installed next to this one.
pub fn sibling_shim_binary() -> Result<PathBuf, HookError> {
    Ok(hook_dir()?.join(SHIM_BINARY))
}

/// Default shim directory: `shims` next to this binary.
pub fn default_shim_dir() -> Result<PathBuf, HookError> {
    Ok(hook_dir()?.join(DEFAULT_SHIM_DIR))
}
