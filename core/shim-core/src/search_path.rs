//! Explicit executable search paths.
//!
//! The resolver never consults the ambient `PATH` itself: callers build a
//! `SearchPath` (usually from the process environment, in tests from temp
//! directories) and hand it in. Lookups go through the `which` crate so the
//! executable-bit and platform extension rules match the shell.
//!
//! ## Exclusions
//!
//! A shim must never pick itself as its own delegate. `Exclusions` holds
//! directories (the shim directory) and files (the running shim binary) in
//! canonical form; any candidate whose parent directory or resolved target
//! matches is skipped.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Ordered list of directories consulted for command lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Parses a `PATH`-style value. Empty segments are dropped rather than
    /// treated as the working directory.
    pub fn parse(value: &OsStr) -> Self {
        let dirs = env::split_paths(value)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();
        Self { dirs }
    }

    /// The current process's `PATH`, or an empty search path when unset.
    pub fn from_env() -> Self {
        env::var_os("PATH")
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    /// Every match for `name`, in search order.
    pub fn find_all(&self, name: &str) -> Vec<PathBuf> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        self.dirs
            .iter()
            .filter_map(|dir| which::which_in(name, Some(dir.as_os_str()), &cwd).ok())
            .collect()
    }

    /// First match for `name` that is not excluded.
    pub fn find_excluding(&self, name: &str, exclusions: &Exclusions) -> Option<PathBuf> {
        let found = self
            .find_all(name)
            .into_iter()
            .find(|candidate| !exclusions.excludes(candidate));
        match &found {
            Some(path) => tracing::debug!(name, path = %path.display(), "Resolved executable"),
            None => tracing::debug!(name, "No executable outside exclusions"),
        }
        found
    }
}

/// Directories and files that must never be chosen as a lookup result.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    dirs: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

impl Exclusions {
    pub fn with_dir(mut self, dir: &Path) -> Self {
        self.dirs.push(canonical(dir));
        self
    }

    pub fn with_file(mut self, file: &Path) -> Self {
        self.files.push(canonical(file));
        self
    }

    pub fn excludes(&self, candidate: &Path) -> bool {
        if let Some(parent) = candidate.parent() {
            let parent = canonical(parent);
            if self.dirs.iter().any(|dir| *dir == parent) {
                return true;
            }
        }
        let target = canonical(candidate);
        self.files.iter().any(|file| *file == target)
    }
}

/// Resolves symlinks when the path exists; otherwise returns it unchanged.
fn canonical(path: &Path) -> PathBuf {
    if path.exists() {
        if let Ok(resolved) = path.canonicalize() {
            return resolved;
        }
    }
    path.to_path_buf()
}
