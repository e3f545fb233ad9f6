//! legacy-shim: the binary behind every shim name.
//!
//! `python`, `python3`, `pip`, `pip3`, `pipx` and `uv` in the shim directory
//! are symlinks to this binary; the invoked name comes from `argv[0]`. Run
//! directly, the first argument names the shim instead:
//!
//! ```bash
//! legacy-shim pip install requests
//! ```
//!
//! ## Exit codes
//!
//! - blocked legacy usage: 1 (configurable)
//! - pass-through: the real binary's exit code
//! - real binary not found: 127
//! - real binary not executable: 126
//! - not invoked under a shim name: 2

use shim_core::config::shim_dir_override;
use shim_core::delegate::{self, DELEGATE_ENV, EXIT_CANNOT_EXECUTE};
use shim_core::{
    logging, Exclusions, Invocation, Resolution, Resolver, SearchPath, ShimConfig, ShimDirSpec,
    ShimName, EXIT_DELEGATE_NOT_FOUND,
};
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    let _logging_guard = logging::init_if_requested();

    let mut argv = env::args_os();
    let argv0 = argv.next().unwrap_or_default();
    let rest: Vec<OsString> = argv.collect();

    let (name, args, via_link) = match ShimName::from_argv0(&argv0) {
        Some(name) => (name, rest, true),
        None => {
            let named = rest
                .split_first()
                .and_then(|(first, tail)| Some((ShimName::parse(first.to_str()?)?, tail.to_vec())));
            match named {
                Some((name, tail)) => (name, tail, false),
                None => {
                    eprintln!("usage: legacy-shim <python|python3|pip|pip3|pipx|uv> [ARGS]...");
                    return ExitCode::from(EXIT_USAGE);
                }
            }
        }
    };

    let exe = env::current_exe().ok();
    let reentered = exe
        .as_deref()
        .is_some_and(|exe| delegate::is_reentry(env::var_os(DELEGATE_ENV).as_deref(), exe));
    let exclusions = exclusions(exe, &argv0, via_link);
    let resolver = Resolver::new(SearchPath::from_env(), exclusions, ShimConfig::load())
        .reentered(reentered);
    let invocation = Invocation::new(name, args);
    let decision = resolver.resolve(&invocation);

    match decision.resolution {
        Resolution::Block(redirect) => {
            tracing::info!(
                shim = %name,
                rule = decision.rule,
                command = %redirect.detected,
                "Blocked legacy invocation"
            );
            eprint!("{redirect}");
            ExitCode::from(resolver.config().blocked_exit_code())
        }
        Resolution::Delegate(program) => match delegate::run(&program, invocation.raw_args()) {
            Ok(code) => ExitCode::from(code),
            Err(e) => {
                tracing::error!(shim = %name, error = %e, "Delegation failed");
                eprintln!("{name}: {e}");
                ExitCode::from(EXIT_CANNOT_EXECUTE)
            }
        },
        Resolution::DelegateMissing(name) => {
            tracing::warn!(shim = %name, "Real binary not found");
            eprintln!("{name}: real {name} binary not found on PATH outside the shim directory");
            ExitCode::from(EXIT_DELEGATE_NOT_FOUND)
        }
    }
}

/// Never delegate back into ourselves: skip this binary (through any
/// symlink), the shim directory (`LEGACY_SHIMS_DIR` or `shims` next to this
/// binary) and, when reached through a path, the directory of that link.
fn exclusions(exe: Option<PathBuf>, argv0: &OsStr, via_link: bool) -> Exclusions {
    let mut exclusions = match exe {
        Some(exe) => {
            let anchor = exe
                .canonicalize()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf));
            match anchor {
                Some(anchor) => ShimDirSpec {
                    anchor,
                    requested: shim_dir_override(),
                }
                .exclusions(&exe),
                None => Exclusions::default().with_file(&exe),
            }
        }
        None => Exclusions::default(),
    };
    if via_link {
        let link = Path::new(argv0);
        if let Some(dir) = link.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            exclusions = exclusions.with_dir(dir);
        }
    }
    exclusions
}
