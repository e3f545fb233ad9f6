//! Pass-through execution of the real binary.
//!
//! The child inherits stdin/stdout/stderr directly, so output ordering is
//! exactly what a direct invocation would produce. The shim blocks until the
//! child exits and returns its status as a process exit code.
//!
//! ## Signals (unix)
//!
//! While the child runs, SIGTERM, SIGHUP, SIGQUIT and SIGINT are caught and
//! re-sent to the child. A terminal Ctrl-C already reaches the whole
//! foreground process group, so SIGINT is only re-sent when another process
//! sent it with kill(2) or sigqueue(3). Signals that arrive before the child
//! exists are replayed to it right after spawn.
//!
//! ## Re-entry
//!
//! The child runs with `LEGACY_SHIMS_DELEGATE` set to the delegate's path. A
//! shim that finds its own binary named there was picked as somebody else's
//! "real" tool and must not delegate again.

use crate::error::{Result, ShimError};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, ExitStatus};

/// Exit code when the delegate exists but cannot be executed.
pub const EXIT_CANNOT_EXECUTE: u8 = 126;

/// Set in the child's environment to the path of the delegate being run.
pub const DELEGATE_ENV: &str = "LEGACY_SHIMS_DELEGATE";

/// True when `marker` (the inherited `LEGACY_SHIMS_DELEGATE` value) names
/// `exe`, i.e. this shim binary was itself chosen as a delegate.
pub fn is_reentry(marker: Option<&OsStr>, exe: &Path) -> bool {
    let Some(marker) = marker.filter(|value| !value.is_empty()) else {
        return false;
    };
    match (Path::new(marker).canonicalize(), exe.canonicalize()) {
        (Ok(marker), Ok(exe)) => marker == exe,
        _ => false,
    }
}

/// Runs `program` with `args`, waits, and returns the exit code to propagate.
pub fn run(program: &Path, args: &[OsString]) -> Result<u8> {
    let guard = forwarding::install();

    let mut child = Command::new(program)
        .args(args)
        .env(DELEGATE_ENV, program)
        .spawn()
        .map_err(|source| ShimError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    guard.attach(child.id());
    tracing::debug!(program = %program.display(), pid = child.id(), "Delegate started");

    let status = child.wait().map_err(|source| ShimError::Io {
        context: format!("waiting for {}", program.display()),
        source,
    })?;
    drop(guard);

    let code = exit_code(status);
    tracing::debug!(program = %program.display(), code, "Delegate exited");
    Ok(code)
}

/// Maps a child's status to our exit code: its own code, or `128 + signal`.
pub fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return (code & 0xff) as u8;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return (128 + signal).clamp(0, 255) as u8;
        }
    }
    1
}

#[cfg(unix)]
mod forwarding {
    use std::sync::atomic::{AtomicI32, Ordering};

    const FORWARDED: [libc::c_int; 4] = [libc::SIGINT, libc::SIGTERM, libc::SIGHUP, libc::SIGQUIT];

    /// `si_code` values for signals sent by another process.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub(super) const SENT_BY_PROCESS: [libc::c_int; 2] = [libc::SI_USER, libc::SI_QUEUE];
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    pub(super) const SENT_BY_PROCESS: [libc::c_int; 2] = [0x10001, 0x10002];

    static CHILD_PID: AtomicI32 = AtomicI32::new(0);
    static PENDING_SIGNAL: AtomicI32 = AtomicI32::new(0);

    extern "C" fn forward(
        signal: libc::c_int,
        info: *mut libc::siginfo_t,
        _context: *mut libc::c_void,
    ) {
        if signal == libc::SIGINT && !sent_by_process(info) {
            return;
        }
        let pid = CHILD_PID.load(Ordering::SeqCst);
        if pid > 0 {
            // SAFETY: kill(2) is async-signal-safe.
            unsafe {
                libc::kill(pid, signal);
            }
        } else {
            PENDING_SIGNAL.store(signal, Ordering::SeqCst);
        }
    }

    /// Terminal-generated signals already reach the child through the
    /// foreground process group.
    pub(super) fn sent_by_process(info: *mut libc::siginfo_t) -> bool {
        if info.is_null() {
            return true;
        }
        // SAFETY: the kernel passes a valid siginfo_t when SA_SIGINFO is set.
        let code = unsafe { (*info).si_code };
        SENT_BY_PROCESS.contains(&code)
    }

    /// Installed handlers; restores the previous dispositions on drop.
    pub struct Guard {
        previous: Vec<(libc::c_int, libc::sigaction)>,
    }

    pub fn install() -> Guard {
        CHILD_PID.store(0, Ordering::SeqCst);
        PENDING_SIGNAL.store(0, Ordering::SeqCst);

        let mut previous = Vec::with_capacity(FORWARDED.len());
        for signal in FORWARDED {
            // SAFETY: sigaction is zero-initializable; the handler only touches
            // atomics and kill(2).
            unsafe {
                let mut action: libc::sigaction = std::mem::zeroed();
                action.sa_sigaction = forward
                    as extern "C" fn(libc::c_int, *mut libc::siginfo_t, *mut libc::c_void)
                    as libc::sighandler_t;
                action.sa_flags = libc::SA_SIGINFO | libc::SA_RESTART;
                libc::sigemptyset(&mut action.sa_mask);

                let mut old: libc::sigaction = std::mem::zeroed();
                if libc::sigaction(signal, &action, &mut old) == 0 {
                    previous.push((signal, old));
                }
            }
        }
        Guard { previous }
    }

    impl Guard {
        pub fn attach(&self, pid: u32) {
            let pid = pid as i32;
            CHILD_PID.store(pid, Ordering::SeqCst);
            let pending = PENDING_SIGNAL.swap(0, Ordering::SeqCst);
            if pending > 0 {
                tracing::debug!(pid, signal = pending, "Replaying early signal to delegate");
                // SAFETY: plain kill(2) on the child we just spawned.
                unsafe {
                    libc::kill(pid, pending);
                }
            }
        }
    }

    impl Drop for Guard {
        fn drop(&mut self) {
            CHILD_PID.store(0, Ordering::SeqCst);
            for (signal, old) in &self.previous {
                // SAFETY: restoring a disposition previously returned by sigaction.
                unsafe {
                    libc::sigaction(*signal, old, std::ptr::null_mut());
                }
            }
        }
    }
}

#[cfg(not(unix))]
mod forwarding {
    pub struct Guard;

    pub fn install() -> Guard {
        Guard
    }

    impl Guard {
        pub fn attach(&self, _pid: u32) {}
    }
}
