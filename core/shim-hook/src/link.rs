//! Shim directory setup.
//!
//! Points every shim name at the `legacy-shim` binary installed next to
//! `shim-hook`. Safe to re-run after an upgrade; existing links are replaced.

use crate::HookError;
use std::path::PathBuf;

pub fn run(dir: Option<PathBuf>) -> Result<(), HookError> {
    let target = crate::sibling_shim_binary()?;
    if !target.is_file() {
        return Err(HookError::ShimBinaryMissing(target));
    }

    let dir = match dir {
        Some(dir) => dir,
        None => crate::default_shim_dir()?,
    };

    link_all(&dir, &target)
}

#[cfg(unix)]
fn link_all(dir: &std::path::Path, target: &std::path::Path) -> Result<(), HookError> {
    for link in shim_core::installer::link_shims(dir, target)? {
        println!("{} -> {}", link.display(), target.display());
    }
    Ok(())
}

#[cfg(not(unix))]
fn link_all(_dir: &std::path::Path, _target: &std::path::Path) -> Result<(), HookError> {
    Err(HookError::Shim(shim_core::ShimError::Io {
        context: "linking shims".to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "symlinked shims require a unix platform",
        ),
    }))
}
