//! # shim-core
//!
//! Interception policy for legacy Python tooling. Six shim names (`python`,
//! `python3`, `pip`, `pip3`, `pipx`, `uv`) shadow the real binaries on `PATH`
//! and either redirect the user to the equivalent `uv` command or delegate to
//! the real binary.
//!
//! ## Design Principles
//!
//! - **Synchronous**: one short-lived process per invocation, no async runtime.
//! - **Explicit inputs**: the resolver and installer take search paths, config
//!   and file locations as arguments; only the binaries read the environment.
//! - **Never break the session**: missing preconditions are silent no-ops.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shim_core::{Exclusions, Invocation, Resolver, SearchPath, ShimConfig, ShimName};
//!
//! let resolver = Resolver::new(SearchPath::from_env(), Exclusions::default(), ShimConfig::load());
//! let decision = resolver.resolve(&Invocation::new(ShimName::Pip, ["install", "requests"]));
//! ```

pub mod config;
pub mod delegate;
pub mod error;
pub mod installer;
pub mod invocation;
pub mod logging;
pub mod patterns;
pub mod redirect;
pub mod resolver;
pub mod search_path;

pub use config::ShimConfig;
pub use error::{Result, ShimError};
pub use installer::{InstallOutcome, SessionInstaller, ShimDirSpec};
pub use invocation::{Invocation, ShimName};
pub use patterns::{Evaluation, Outcome, PatternTable};
pub use redirect::{Redirect, Suggestion};
pub use resolver::{Decision, Resolution, Resolver};
pub use search_path::{Exclusions, SearchPath};

/// Exit code when pass-through finds no real binary.
pub const EXIT_DELEGATE_NOT_FOUND: u8 = 127;
