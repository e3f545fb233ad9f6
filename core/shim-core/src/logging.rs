//! File logging for the hook and the shims.
//!
//! Stderr belongs to the user (redirect messages, delegate output), so logs
//! only ever go to ~/.claude/logs/legacy-shims.log. Hold the returned guard
//! for the life of `main` so buffered lines are flushed on exit.
//!
//! The session hook always logs. Shims write nothing unless asked to with
//! `LEGACY_SHIMS_LOG` or `LEGACY_SHIMS_DEBUG_LOG`; without a subscriber the
//! `tracing` macros are no-ops.

use crate::config::{env_flag, get_claude_dir, DEBUG_LOG_ENV, LOG_FILTER_ENV};
use std::env;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "legacy-shims.log";

/// Initializes logging; returns `None` (logging disabled) if no home
/// directory is known or the log directory can't be created.
pub fn init() -> Option<WorkerGuard> {
    let dir = get_claude_dir()?.join(LOG_DIR);
    init_in(&dir)
}

/// Like [`init`], but only when a log filter or debug logging was requested.
pub fn init_if_requested() -> Option<WorkerGuard> {
    if !requested() {
        return None;
    }
    init()
}

fn requested() -> bool {
    env_flag(DEBUG_LOG_ENV) || env::var_os(LOG_FILTER_ENV).is_some_and(|value| !value.is_empty())
}

pub fn init_in(dir: &Path) -> Option<WorkerGuard> {
    fs_err::create_dir_all(dir).ok()?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(dir)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

fn filter() -> EnvFilter {
    if env_flag(DEBUG_LOG_ENV) {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}
