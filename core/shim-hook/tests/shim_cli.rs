//! End-to-end tests for the `legacy-shim` multicall binary.
//!
//! Each test builds a shim directory of symlinks to the real binary, an
//! optional "real" directory with fake tools, and runs the shim with an
//! explicit PATH and HOME.
#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const SHIM_NAMES: [&str; 6] = ["python", "python3", "pip", "pip3", "pipx", "uv"];

const FAKE_UV: &str = r#"#!/bin/sh
if [ "$1" = "--version" ]; then
    echo "uv 0.0.0-fake"
fi
if [ "$1" = "cat" ]; then
    cat
fi
exit ${FAKE_UV_EXIT:-0}
"#;

struct ShimEnv {
    root: TempDir,
}

impl ShimEnv {
    fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let shims = root.path().join("shims");
        fs::create_dir_all(&shims).unwrap();
        fs::create_dir_all(root.path().join("real")).unwrap();
        fs::create_dir_all(root.path().join("home")).unwrap();
        for name in SHIM_NAMES {
            symlink(env!("CARGO_BIN_EXE_legacy-shim"), shims.join(name))
                .expect("Failed to link shim");
        }
        Self { root }
    }

    fn with_real(self, name: &str, script: &str) -> Self {
        let path = self.root.path().join("real").join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    fn shims(&self) -> PathBuf {
        self.root.path().join("shims")
    }

    fn path_var(&self) -> String {
        format!(
            "{}:{}",
            self.shims().display(),
            self.root.path().join("real").display()
        )
    }

    fn command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.env("PATH", self.path_var())
            .env("HOME", self.root.path().join("home"))
            .env_remove("LEGACY_SHIMS_DIR")
            .env_remove("LEGACY_SHIMS_LOG")
            .env_remove("LEGACY_SHIMS_DEBUG_LOG")
            .env_remove("LEGACY_SHIMS_DELEGATE")
            .env_remove("FAKE_UV_EXIT");
        cmd
    }

    fn run(&self, name: &str, args: &[&str]) -> Output {
        self.command(&self.shims().join(name))
            .args(args)
            .output()
            .expect("Failed to run shim")
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_blocked(output: &Output, needles: &[&str]) {
    assert_ne!(output.status.code(), Some(0), "expected non-zero exit");
    let text = stderr(output);
    for needle in needles {
        assert!(text.contains(needle), "stderr missing {needle:?}:\n{text}");
    }
}

// MARK: - python / python3

#[test]
fn test_python_without_args_is_blocked() {
    let env = ShimEnv::new();
    assert_blocked(&env.run("python", &[]), &["python", "uv run python"]);
}

#[test]
fn test_python3_without_args_uses_invoked_name() {
    let env = ShimEnv::new();
    assert_blocked(&env.run("python3", &[]), &["uv run python3"]);
}

#[test]
fn test_python_pip_module_suggests_add_and_remove() {
    let env = ShimEnv::new();
    let output = env.run("python", &["-m", "pip", "install", "requests"]);
    assert_blocked(&output, &["python -m pip install requests", "uv add", "uv remove"]);
}

#[test]
fn test_python_script_keeps_arguments() {
    let env = ShimEnv::new();
    let output = env.run("python3", &["manage.py", "migrate"]);
    assert_blocked(&output, &["uv run python3 manage.py migrate"]);
}

#[test]
fn test_python_blocks_even_when_real_python_exists() {
    let env = ShimEnv::new().with_real("python", "#!/bin/sh\nexit 0\n");
    assert_blocked(&env.run("python", &["-c", "print(1)"]), &["uv run python -c"]);
}

// MARK: - pip / pip3 / pipx

#[test]
fn test_pip_install_suggests_add_and_with() {
    let env = ShimEnv::new();
    let output = env.run("pip", &["install", "requests"]);
    assert_blocked(&output, &["pip install requests", "uv add", "uv run --with"]);
}

#[test]
fn test_pip3_freeze_suggests_export() {
    let env = ShimEnv::new();
    assert_blocked(&env.run("pip3", &["freeze"]), &["pip3 freeze", "uv export"]);
}

#[test]
fn test_pip_show_gets_generic_pointer() {
    let env = ShimEnv::new();
    assert_blocked(&env.run("pip", &["show", "requests"]), &["uv"]);
}

#[test]
fn test_pipx_inject_suggests_tool_install_with() {
    let env = ShimEnv::new();
    let output = env.run("pipx", &["inject", "black", "click"]);
    assert_blocked(&output, &["uv tool install --with", "click", "black"]);
}

#[test]
fn test_pipx_unknown_subcommand_points_at_uv_tool() {
    let env = ShimEnv::new();
    assert_blocked(&env.run("pipx", &["frobnicate"]), &["uv tool"]);
}

#[test]
fn test_blocked_exit_code_is_one_by_default() {
    let env = ShimEnv::new();
    assert_eq!(env.run("pip", &["install", "x"]).status.code(), Some(1));
}

#[test]
fn test_blocked_exit_code_from_config() {
    let env = ShimEnv::new();
    let claude = env.root.path().join("home/.claude");
    fs::create_dir_all(&claude).unwrap();
    fs::write(claude.join("legacy-shims.json"), r#"{"blockedExitCode": 3}"#).unwrap();

    assert_eq!(env.run("pipx", &["list"]).status.code(), Some(3));
}

// MARK: - uv

#[test]
fn test_uv_pip_freeze_is_legacy() {
    let env = ShimEnv::new().with_real("uv", FAKE_UV);
    assert_blocked(&env.run("uv", &["pip", "freeze"]), &["legacy"]);
}

#[test]
fn test_uv_pip_install_suggests_add() {
    let env = ShimEnv::new().with_real("uv", FAKE_UV);
    assert_blocked(&env.run("uv", &["pip", "install", "httpx"]), &["uv add httpx"]);
}

#[test]
fn test_uv_version_passes_through() {
    let env = ShimEnv::new().with_real("uv", FAKE_UV);
    let output = env.run("uv", &["--version"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("uv"));
}

#[test]
fn test_uv_exit_code_is_propagated() {
    let env = ShimEnv::new().with_real("uv", FAKE_UV);
    let output = env
        .command(&env.shims().join("uv"))
        .arg("sync")
        .env("FAKE_UV_EXIT", "3")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_uv_pass_through_inherits_stdin() {
    let env = ShimEnv::new().with_real("uv", FAKE_UV);
    let mut child = env
        .command(&env.shims().join("uv"))
        .arg("cat")
        .env("PATH", format!("{}:/bin:/usr/bin", env.path_var()))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"through the shim\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "through the shim\n");
}

#[test]
fn test_uv_without_real_binary_exits_127() {
    let env = ShimEnv::new();
    let output = env.run("uv", &["--version"]);
    assert_eq!(output.status.code(), Some(127));
    assert!(stderr(&output).contains("real uv binary not found"));
}

// MARK: - escape hatches

#[test]
fn test_pip_cannot_be_switched_to_pass_through() {
    let env = ShimEnv::new().with_real("pip", "#!/bin/sh\necho \"real pip $*\"\n");
    let claude = env.root.path().join("home/.claude");
    fs::create_dir_all(&claude).unwrap();
    fs::write(claude.join("legacy-shims.json"), r#"{"disabled": ["pip"]}"#).unwrap();

    let output = env
        .command(&env.shims().join("pip"))
        .args(["install", "requests"])
        .env("LEGACY_SHIMS_BYPASS", "1")
        .output()
        .unwrap();
    assert_blocked(&output, &["uv add requests"]);
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_higher_priority_dir_bypasses_shims() {
    let env = ShimEnv::new();
    let venv_bin = env.root.path().join("venv-bin");
    fs::create_dir_all(&venv_bin).unwrap();
    let python = venv_bin.join("python");
    fs::write(&python, "#!/bin/sh\necho venv python\n").unwrap();
    fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();

    let output = Command::new("sh")
        .args(["-c", "python"])
        .env(
            "PATH",
            format!("{}:{}:/bin:/usr/bin", venv_bin.display(), env.path_var()),
        )
        .env("HOME", env.root.path().join("home"))
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "venv python\n");
}

// MARK: - direct invocation

#[test]
fn test_direct_invocation_names_shim_in_first_arg() {
    let env = ShimEnv::new();
    let output = env
        .command(Path::new(env!("CARGO_BIN_EXE_legacy-shim")))
        .args(["pip", "install", "requests"])
        .output()
        .unwrap();
    assert_blocked(&output, &["uv add requests"]);
}

#[test]
fn test_direct_invocation_without_name_is_usage_error() {
    let env = ShimEnv::new();
    let output = env
        .command(Path::new(env!("CARGO_BIN_EXE_legacy-shim")))
        .arg("ruby")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("usage"));
}

// MARK: - loops between shim installs

#[test]
fn test_second_shim_copy_is_not_a_real_uv() {
    let env = ShimEnv::new();
    let other = env.root.path().join("other-shims");
    fs::create_dir_all(&other).unwrap();
    fs::copy(env!("CARGO_BIN_EXE_legacy-shim"), other.join("uv")).unwrap();

    // Bare argv[0], as a shell produces after a PATH lookup.
    let output = Command::new("sh")
        .args(["-c", "uv --version"])
        .env(
            "PATH",
            format!("{}:{}:/bin:/usr/bin", env.shims().display(), other.display()),
        )
        .env("HOME", env.root.path().join("home"))
        .env_remove("LEGACY_SHIMS_DELEGATE")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(127), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("real uv binary not found"));
}

#[test]
fn test_configured_shim_dir_is_skipped_for_bare_name() {
    let env = ShimEnv::new().with_real("uv", FAKE_UV);
    let output = Command::new("sh")
        .args(["-c", "uv --version"])
        .env("PATH", format!("{}:/bin:/usr/bin", env.path_var()))
        .env("HOME", env.root.path().join("home"))
        .env("LEGACY_SHIMS_DIR", env.shims())
        .env_remove("LEGACY_SHIMS_DELEGATE")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "uv 0.0.0-fake\n");
}

// MARK: - side effects

#[test]
fn test_blocked_call_leaves_home_untouched() {
    let env = ShimEnv::new();
    let output = env.run("pip", &["install", "requests"]);
    assert_blocked(&output, &["uv add requests"]);

    let entries: Vec<_> = fs::read_dir(env.root.path().join("home"))
        .unwrap()
        .collect();
    assert!(entries.is_empty(), "home was written to: {entries:?}");
}

#[test]
fn test_log_file_written_only_when_requested() {
    let env = ShimEnv::new();
    let output = env
        .command(&env.shims().join("pip"))
        .args(["install", "requests"])
        .env("LEGACY_SHIMS_LOG", "info")
        .output()
        .unwrap();
    assert_blocked(&output, &["uv add requests"]);

    let log = env.root.path().join("home/.claude/logs/legacy-shims.log");
    let content = fs::read_to_string(&log).unwrap();
    assert!(content.contains("Blocked legacy invocation"));
}

// MARK: - signals

const TRAPPING_UV: &str = r#"#!/bin/sh
trap 'touch "$TRAP_MARKER"; exit 5' TERM
touch "$TRAP_READY"
while :; do sleep 0.1; done
"#;

fn wait_for(path: &Path) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !path.exists() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", path.display());
        thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_sigterm_is_forwarded_to_delegate() {
    let env = ShimEnv::new().with_real("uv", TRAPPING_UV);
    let ready = env.root.path().join("ready");
    let marker = env.root.path().join("trapped");

    let mut child = env
        .command(&env.shims().join("uv"))
        .arg("run")
        .env("PATH", format!("{}:/bin:/usr/bin", env.path_var()))
        .env("TRAP_READY", &ready)
        .env("TRAP_MARKER", &marker)
        .spawn()
        .unwrap();
    wait_for(&ready);

    let kill = Command::new("sh")
        .args(["-c", &format!("kill -TERM {}", child.id())])
        .status()
        .unwrap();
    assert!(kill.success());

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(5));
    assert!(marker.exists());
}
