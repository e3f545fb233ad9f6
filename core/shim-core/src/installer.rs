//! Session-start activation of the shim directory.
//!
//! This module handles:
//! - Checking that the real `uv` is installed (shims are useless without it)
//! - Checking that the runtime supplied a session environment file
//! - Resolving the shim directory to an absolute path
//! - Appending one `export PATH=...` line to the session environment file
//! - Linking the shim names to the multicall shim binary
//!
//! ## Design
//!
//! Missing preconditions are a silent no-op: session startup must never fail
//! because uv is absent or the runtime didn't provide an env file. Only a
//! broken installation (shim directory missing) or an unwritable env file is
//! an error. The env file is append-only; other hooks may already have written
//! to it.

use crate::error::{Result, ShimError};
use crate::invocation::ShimName;
use crate::search_path::{Exclusions, SearchPath};
use fs_err as fs;
use fs_err::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default shim directory, relative to the hook binary's own directory.
pub const DEFAULT_SHIM_DIR: &str = "shims";

/// Binary every shim name links to.
pub const SHIM_BINARY: &str = "legacy-shim";

const MODERN_TOOL: &str = "uv";

/// What a session-start run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The line was appended; shims are active for the session.
    Activated { shim_dir: PathBuf, line: String },
    /// No real `uv` on the search path; nothing written.
    UvMissing,
    /// The runtime supplied no session environment file; nothing written.
    EnvFileUnset,
}

/// Where the shim directory should be looked for.
#[derive(Debug, Clone)]
pub struct ShimDirSpec {
    /// Directory relative paths are resolved against (the hook binary's dir).
    pub anchor: PathBuf,
    /// Explicit request, absolute or relative to `anchor`.
    pub requested: Option<PathBuf>,
}

impl ShimDirSpec {
    pub fn candidate(&self) -> PathBuf {
        match &self.requested {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.anchor.join(path),
            None => self.anchor.join(DEFAULT_SHIM_DIR),
        }
    }

    /// Lookup exclusions for a shim binary installed at `shim_binary`: the
    /// binary itself and the shim directory, whether or not it exists.
    pub fn exclusions(&self, shim_binary: &Path) -> Exclusions {
        Exclusions::default()
            .with_dir(&self.candidate())
            .with_file(shim_binary)
    }

    /// Canonical absolute shim directory, or `ShimDirUnresolvable`.
    pub fn resolve(&self) -> Result<PathBuf> {
        let candidate = self.candidate();
        let resolved = candidate
            .canonicalize()
            .map_err(|err| ShimError::ShimDirUnresolvable {
                path: candidate.clone(),
                reason: err.to_string(),
            })?;
        if !resolved.is_dir() {
            return Err(ShimError::ShimDirUnresolvable {
                path: candidate,
                reason: "not a directory".to_string(),
            });
        }
        Ok(resolved)
    }
}

/// One-shot session activation with all inputs explicit.
pub struct SessionInstaller {
    search_path: SearchPath,
    env_file: Option<PathBuf>,
    shim_dir: ShimDirSpec,
}

impl SessionInstaller {
    pub fn new(search_path: SearchPath, env_file: Option<PathBuf>, shim_dir: ShimDirSpec) -> Self {
        Self {
            search_path,
            env_file,
            shim_dir,
        }
    }

    pub fn run(&self) -> Result<InstallOutcome> {
        // The shim dir may already be on PATH from an earlier activation;
        // its `uv` shim must not count as the real tool.
        let exclusions = Exclusions::default().with_dir(&self.shim_dir.candidate());
        let Some(uv) = self.search_path.find_excluding(MODERN_TOOL, &exclusions) else {
            tracing::info!("uv not found on PATH, shims stay inactive");
            return Ok(InstallOutcome::UvMissing);
        };
        tracing::debug!(uv = %uv.display(), "Found real uv");

        let Some(env_file) = self.env_file.as_deref() else {
            tracing::warn!("Session environment file not provided, shims stay inactive");
            return Ok(InstallOutcome::EnvFileUnset);
        };

        let shim_dir = self.shim_dir.resolve()?;
        let line = export_line(&shim_dir)?;
        append_line(env_file, &line)?;

        tracing::info!(
            shim_dir = %shim_dir.display(),
            env_file = %env_file.display(),
            "Shims activated for session"
        );
        Ok(InstallOutcome::Activated { shim_dir, line })
    }
}

/// `export PATH="<dir>:${PATH}"`, with `"`, `$`, `` ` `` and `\` escaped.
pub fn export_line(shim_dir: &Path) -> Result<String> {
    if !shim_dir.is_absolute() {
        return Err(ShimError::ShimDirUnresolvable {
            path: shim_dir.to_path_buf(),
            reason: "path is not absolute".to_string(),
        });
    }
    let dir = shim_dir
        .to_str()
        .ok_or_else(|| ShimError::NonUtf8Path(shim_dir.to_path_buf()))?;

    let mut escaped = String::with_capacity(dir.len());
    for c in dir.chars() {
        if matches!(c, '"' | '$' | '`' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Ok(format!("export PATH=\"{escaped}:${{PATH}}\""))
}

/// Appends `line` on its own line, never truncating existing content.
fn append_line(path: &Path, line: &str) -> Result<()> {
    let write_err = |source| ShimError::EnvFileWrite {
        path: path.to_path_buf(),
        source,
    };

    let needs_newline = match fs::read(path) {
        Ok(existing) => existing.last().is_some_and(|b| *b != b'\n'),
        Err(_) => false,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    let mut content = String::with_capacity(line.len() + 2);
    if needs_newline {
        content.push('\n');
    }
    content.push_str(line);
    content.push('\n');
    file.write_all(content.as_bytes()).map_err(write_err)
}

/// Creates (or refreshes) one symlink per shim name in `dir`, each pointing
/// at `target`. Returns the created link paths.
#[cfg(unix)]
pub fn link_shims(dir: &Path, target: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|source| ShimError::Io {
        context: format!("creating {}", dir.display()),
        source,
    })?;

    let mut links = Vec::with_capacity(ShimName::ALL.len());
    for name in ShimName::ALL {
        let link = dir.join(name.as_str());
        let link_err = |source| ShimError::Link {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            source,
        };

        if link.symlink_metadata().is_ok() {
            fs::remove_file(&link).map_err(link_err)?;
        }
        std::os::unix::fs::symlink(target, &link).map_err(link_err)?;
        tracing::debug!(link = %link.display(), target = %target.display(), "Linked shim");
        links.push(link);
    }
    Ok(links)
}
