//! Argument-shape dispatch tables.
//!
//! Each shim family owns one `PatternTable`: an ordered list of rules, each a
//! `(predicate, action)` pair, plus a fallback. The first rule whose predicate
//! holds wins, so precedence is the slice order.
//!
//! ## Tables
//!
//! ```text
//! python/python3  no-args → inline-code → pip-module → module → script → (generic prefix)
//! pip/pip3        install → uninstall → freeze → list → (generic pointer)
//! pipx            install → uninstall → run → upgrade → upgrade-all → inject
//!                 → list → ensurepath → (uv tool pointer)
//! uv              pip-install → pip-sync → pip-freeze → pip-uninstall → (pass through)
//! ```
//!
//! Only the `uv` table ever yields `PassThrough`.

use crate::invocation::{Invocation, ShimName};
use crate::redirect::Redirect;
use std::borrow::Cow;

/// Name reported when no rule matched and the fallback action ran.
pub const FALLBACK_RULE: &str = "fallback";

const PACKAGE_PLACEHOLDER: &str = "<package>";
const COMMAND_PLACEHOLDER: &str = "<command>";
const DEPENDENCY_PLACEHOLDER: &str = "<dependency>";
const PLACEHOLDERS: [&str; 3] = [
    PACKAGE_PLACEHOLDER,
    COMMAND_PLACEHOLDER,
    DEPENDENCY_PLACEHOLDER,
];

/// pip flags whose next argument is a value rather than a package.
const PIP_VALUE_FLAGS: [&str; 14] = [
    "-r",
    "--requirement",
    "-e",
    "--editable",
    "-c",
    "--constraint",
    "-i",
    "--index-url",
    "--extra-index-url",
    "-t",
    "--target",
    "-f",
    "--find-links",
    "--python",
];

/// What a shim should do with an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Block(Redirect),
    PassThrough,
}

/// One `(predicate, action)` entry.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&Invocation) -> bool,
    pub action: fn(&Invocation) -> Outcome,
}

/// Ordered rules with a default action.
pub struct PatternTable {
    pub rules: &'static [Rule],
    pub fallback: fn(&Invocation) -> Outcome,
}

/// Result of evaluating a table: the matched rule name and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub rule: &'static str,
    pub outcome: Outcome,
}

impl PatternTable {
    /// The table that governs a given shim.
    pub fn for_shim(name: ShimName) -> &'static PatternTable {
        match name {
            ShimName::Python | ShimName::Python3 => &PYTHON_TABLE,
            ShimName::Pip | ShimName::Pip3 => &PIP_TABLE,
            ShimName::Pipx => &PIPX_TABLE,
            ShimName::Uv => &UV_TABLE,
        }
    }

    pub fn evaluate(&self, invocation: &Invocation) -> Evaluation {
        for rule in self.rules {
            if (rule.applies)(invocation) {
                return Evaluation {
                    rule: rule.name,
                    outcome: (rule.action)(invocation),
                };
            }
        }
        Evaluation {
            rule: FALLBACK_RULE,
            outcome: (self.fallback)(invocation),
        }
    }

    /// Priority index of a rule, for asserting precedence.
    pub fn position(&self, rule: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == rule)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Shared helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Joins a fixed command prefix with user arguments, shell-quoted.
/// Placeholders stay bare so they read as something to fill in.
fn command<'a>(prefix: &[&'a str], rest: impl IntoIterator<Item = &'a str>) -> String {
    prefix
        .iter()
        .copied()
        .chain(rest)
        .map(quote_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_word(word: &str) -> Cow<'_, str> {
    if PLACEHOLDERS.contains(&word) {
        Cow::Borrowed(word)
    } else {
        shell_words::quote(word)
    }
}

fn args_after(invocation: &Invocation, index: usize) -> &[String] {
    invocation.args().get(index + 1..).unwrap_or(&[])
}

/// Positional arguments, skipping flags and the values of value-taking flags.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_value = false;
    for arg in args {
        if skip_value {
            skip_value = false;
            continue;
        }
        if arg.starts_with('-') {
            skip_value = PIP_VALUE_FLAGS.contains(&arg.as_str());
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

/// Value of the first `-r`/`--requirement` flag (either `-r x` or `--requirement=x`).
fn requirements_file(args: &[String]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-r" || arg == "--requirement" {
            return iter.next().map(String::as_str);
        }
        if let Some(value) = arg.strip_prefix("--requirement=") {
            return Some(value);
        }
    }
    None
}

/// The pip install options `uv add` also accepts, in uv's spelling:
/// `-r FILE` and `--editable PATH`. Everything else pip-specific is dropped.
fn carried_options(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-r" | "--requirement" => {
                if let Some(file) = iter.next() {
                    out.extend(["-r", file.as_str()]);
                }
            }
            "-e" | "--editable" => {
                if let Some(path) = iter.next() {
                    out.extend(["--editable", path.as_str()]);
                }
            }
            other => {
                if let Some(file) = other.strip_prefix("--requirement=") {
                    out.extend(["-r", file]);
                } else if let Some(path) = other.strip_prefix("--editable=") {
                    out.extend(["--editable", path]);
                }
            }
        }
    }
    out
}

/// `uv add` equivalent of pip install arguments.
fn add_command(args: &[String]) -> String {
    let mut words = carried_options(args);
    words.extend(positionals(args));
    command(&["uv", "add"], packages_or_placeholder(words))
}

fn packages_or_placeholder(packages: Vec<&str>) -> Vec<&str> {
    if packages.is_empty() {
        vec![PACKAGE_PLACEHOLDER]
    } else {
        packages
    }
}

fn is_subcommand(invocation: &Invocation, subcommand: &str) -> bool {
    invocation
        .first_positional()
        .and_then(|index| invocation.arg(index))
        == Some(subcommand)
}

/// Arguments that follow the first positional (the subcommand).
fn subcommand_args(invocation: &Invocation) -> &[String] {
    match invocation.first_positional() {
        Some(index) => args_after(invocation, index),
        None => &[],
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// python / python3
// ═══════════════════════════════════════════════════════════════════════════════

static PYTHON_TABLE: PatternTable = PatternTable {
    rules: &[
        Rule {
            name: "no-args",
            applies: Invocation::is_empty,
            action: python_repl,
        },
        Rule {
            name: "inline-code",
            applies: |inv| inv.arg(0) == Some("-c"),
            action: python_prefixed,
        },
        Rule {
            name: "pip-module",
            applies: |inv| inv.arg(0) == Some("-m") && inv.arg(1) == Some("pip"),
            action: python_pip_module,
        },
        Rule {
            name: "module",
            applies: |inv| inv.arg(0) == Some("-m") && inv.arg(1).is_some(),
            action: python_prefixed,
        },
        Rule {
            name: "script",
            applies: |inv| inv.arg(0).is_some_and(|arg| !arg.starts_with('-')),
            action: python_prefixed,
        },
    ],
    fallback: python_prefixed,
};

fn python_repl(inv: &Invocation) -> Outcome {
    let name = inv.name().as_str();
    Outcome::Block(
        Redirect::new(inv.command_line())
            .suggest(
                command(&["uv", "run", name], std::iter::empty()),
                "interpreter in the project environment",
            )
            .note("uv picks the interpreter and environment for the project."),
    )
}

fn python_prefixed(inv: &Invocation) -> Outcome {
    let name = inv.name().as_str();
    let run = command(&["uv", "run", name], inv.args().iter().map(String::as_str));
    Outcome::Block(
        Redirect::new(inv.command_line())
            .suggest(run, "run in the project environment")
            .note("uv picks the interpreter and environment for the project."),
    )
}

/// `python -m pip …` cannot reveal whether the user is adding or removing,
/// so both directions are offered.
fn python_pip_module(inv: &Invocation) -> Outcome {
    let pip_args = args_after(inv, 1);
    let packages = match pip_args.first() {
        Some(action) if !action.starts_with('-') => positionals(&pip_args[1..]),
        _ => positionals(pip_args),
    };
    let packages = packages_or_placeholder(packages);

    Outcome::Block(
        Redirect::new(inv.command_line())
            .suggest(command(&["uv", "add"], packages.iter().copied()), "add dependencies")
            .suggest(
                command(&["uv", "remove"], packages.iter().copied()),
                "remove dependencies",
            )
            .note("pip is not invoked directly; uv edits pyproject.toml and the lockfile."),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// pip / pip3
// ═══════════════════════════════════════════════════════════════════════════════

static PIP_TABLE: PatternTable = PatternTable {
    rules: &[
        Rule {
            name: "install",
            applies: |inv| is_subcommand(inv, "install"),
            action: pip_install,
        },
        Rule {
            name: "uninstall",
            applies: |inv| is_subcommand(inv, "uninstall"),
            action: pip_uninstall,
        },
        Rule {
            name: "freeze",
            applies: |inv| is_subcommand(inv, "freeze"),
            action: pip_freeze,
        },
        Rule {
            name: "list",
            applies: |inv| is_subcommand(inv, "list"),
            action: pip_list,
        },
    ],
    fallback: pip_generic,
};

fn pip_install(inv: &Invocation) -> Outcome {
    let rest = subcommand_args(inv);
    let add = add_command(rest);

    let one_off = match requirements_file(rest) {
        Some(file) => command(
            &["uv", "run", "--with-requirements", file],
            [COMMAND_PLACEHOLDER],
        ),
        None => {
            let packages = packages_or_placeholder(positionals(rest)).join(",");
            command(&["uv", "run", "--with", packages.as_str()], [COMMAND_PLACEHOLDER])
        }
    };

    Outcome::Block(
        Redirect::new(inv.command_line())
            .suggest(add, "add to the project's dependencies")
            .suggest(one_off, "one-off, without touching the project"),
    )
}

fn pip_uninstall(inv: &Invocation) -> Outcome {
    let packages = packages_or_placeholder(positionals(subcommand_args(inv)));
    Outcome::Block(Redirect::new(inv.command_line()).suggest(
        command(&["uv", "remove"], packages),
        "remove from the project's dependencies",
    ))
}

fn pip_freeze(inv: &Invocation) -> Outcome {
    Outcome::Block(
        Redirect::new(inv.command_line())
            .suggest(
                "uv export --format requirements-txt",
                "pinned requirements from the lockfile",
            )
            .suggest("uv tree", "inspect the resolved dependency tree"),
    )
}

fn pip_list(inv: &Invocation) -> Outcome {
    Outcome::Block(
        Redirect::new(inv.command_line())
            .suggest("uv tree", "inspect the resolved dependency tree"),
    )
}

fn pip_generic(inv: &Invocation) -> Outcome {
    Outcome::Block(
        Redirect::new(inv.command_line())
            .suggest("uv add <package>", "add a dependency")
            .suggest("uv remove <package>", "remove a dependency")
            .suggest("uv --help", "everything else")
            .note("pip is not used directly; uv manages the project environment."),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// pipx
// ═══════════════════════════════════════════════════════════════════════════════

static PIPX_TABLE: PatternTable = PatternTable {
    rules: &[
        Rule {
            name: "install",
            applies: |inv| is_subcommand(inv, "install"),
            action: pipx_install,
        },
        Rule {
            name: "uninstall",
            applies: |inv| is_subcommand(inv, "uninstall"),
            action: pipx_uninstall,
        },
        Rule {
            name: "run",
            applies: |inv| is_subcommand(inv, "run"),
            action: pipx_run,
        },
        Rule {
            name: "upgrade",
            applies: |inv| is_subcommand(inv, "upgrade"),
            action: pipx_upgrade,
        },
        Rule {
            name: "upgrade-all",
            applies: |inv| is_subcommand(inv, "upgrade-all"),
            action: |inv| pipx_fixed(inv, "uv tool upgrade --all", "upgrade every installed tool"),
        },
        Rule {
            name: "inject",
            applies: |inv| is_subcommand(inv, "inject"),
            action: pipx_inject,
        },
        Rule {
            name: "list",
            applies: |inv| is_subcommand(inv, "list"),
            action: |inv| pipx_fixed(inv, "uv tool list", "list installed tools"),
        },
        Rule {
            name: "ensurepath",
            applies: |inv| is_subcommand(inv, "ensurepath"),
            action: |inv| pipx_fixed(inv, "uv tool update-shell", "put the tool bin dir on PATH"),
        },
    ],
    fallback: |inv| pipx_fixed(inv, "uv tool --help", "uv tool replaces pipx"),
};

fn pipx_per_package(inv: &Invocation, prefix: &[&str], purpose: &'static str) -> Outcome {
    let packages = packages_or_placeholder(positionals(subcommand_args(inv)));
    let redirect = packages
        .into_iter()
        .fold(Redirect::new(inv.command_line()), |redirect, package| {
            redirect.suggest(command(prefix, [package]), purpose)
        });
    Outcome::Block(redirect)
}

fn pipx_install(inv: &Invocation) -> Outcome {
    pipx_per_package(inv, &["uv", "tool", "install"], "install as an isolated tool")
}

fn pipx_uninstall(inv: &Invocation) -> Outcome {
    pipx_per_package(inv, &["uv", "tool", "uninstall"], "remove the tool")
}

fn pipx_upgrade(inv: &Invocation) -> Outcome {
    pipx_per_package(inv, &["uv", "tool", "upgrade"], "upgrade the tool")
}

/// `pipx run <pkg> [args…]` keeps the trailing arguments verbatim.
fn pipx_run(inv: &Invocation) -> Outcome {
    let rest = subcommand_args(inv);
    let run = match rest.iter().position(|arg| !arg.starts_with('-')) {
        Some(index) => command(&["uvx"], rest[index..].iter().map(String::as_str)),
        None => command(&["uvx"], [PACKAGE_PLACEHOLDER]),
    };
    Outcome::Block(
        Redirect::new(inv.command_line()).suggest(run, "run in a throwaway environment"),
    )
}

/// `pipx inject <pkg> <dep>…` becomes a reinstall with extra dependencies.
fn pipx_inject(inv: &Invocation) -> Outcome {
    let positional = positionals(subcommand_args(inv));
    let (package, deps) = match positional.split_first() {
        Some((package, deps)) => (*package, deps.to_vec()),
        None => (PACKAGE_PLACEHOLDER, Vec::new()),
    };
    let deps = if deps.is_empty() {
        vec![DEPENDENCY_PLACEHOLDER]
    } else {
        deps
    };

    let mut words = Vec::with_capacity(deps.len() * 2 + 1);
    for dep in deps {
        words.push("--with");
        words.push(dep);
    }
    words.push(package);

    Outcome::Block(
        Redirect::new(inv.command_line()).suggest(
            command(&["uv", "tool", "install"], words),
            "reinstall the tool with extra dependencies",
        ),
    )
}

fn pipx_fixed(inv: &Invocation, replacement: &str, purpose: &'static str) -> Outcome {
    Outcome::Block(Redirect::new(inv.command_line()).suggest(replacement, purpose))
}

// ═══════════════════════════════════════════════════════════════════════════════
// uv
// ═══════════════════════════════════════════════════════════════════════════════

static UV_TABLE: PatternTable = PatternTable {
    rules: &[
        Rule {
            name: "pip-install",
            applies: |inv| is_uv_pip(inv, "install"),
            action: uv_pip_install,
        },
        Rule {
            name: "pip-sync",
            applies: |inv| is_uv_pip(inv, "sync"),
            action: |inv| {
                Outcome::Block(
                    uv_pip_redirect(inv)
                        .suggest("uv sync", "sync the environment with the lockfile"),
                )
            },
        },
        Rule {
            name: "pip-freeze",
            applies: |inv| is_uv_pip(inv, "freeze"),
            action: |inv| {
                Outcome::Block(
                    uv_pip_redirect(inv)
                        .suggest("uv export --format requirements-txt", "pinned requirements")
                        .suggest("uv tree", "inspect the dependency tree"),
                )
            },
        },
        Rule {
            name: "pip-uninstall",
            applies: |inv| is_uv_pip(inv, "uninstall"),
            action: uv_pip_uninstall,
        },
    ],
    fallback: |_| Outcome::PassThrough,
};

fn is_uv_pip(inv: &Invocation, action: &str) -> bool {
    inv.arg(0) == Some("pip") && inv.arg(1) == Some(action)
}

fn uv_pip_redirect(inv: &Invocation) -> Redirect {
    Redirect::new(inv.command_line())
        .note("`uv pip` is the legacy pip interface; use uv's project commands instead.")
}

fn uv_pip_install(inv: &Invocation) -> Outcome {
    let add = add_command(args_after(inv, 1));
    Outcome::Block(uv_pip_redirect(inv).suggest(add, "add to the project's dependencies"))
}

fn uv_pip_uninstall(inv: &Invocation) -> Outcome {
    let packages = packages_or_placeholder(positionals(args_after(inv, 1)));
    let remove = command(&["uv", "remove"], packages);
    Outcome::Block(uv_pip_redirect(inv).suggest(remove, "remove from the project"))
}
