//! Interception policy: turns an invocation into block / delegate / missing.
//!
//! The resolver is pure apart from filesystem lookups. It takes the search
//! path, exclusions and config explicitly, so the same decision can be
//! reproduced in tests or in `shim-hook explain` without touching the process
//! environment.

use crate::config::ShimConfig;
use crate::invocation::{Invocation, ShimName};
use crate::patterns::{Evaluation, Outcome, PatternTable};
use crate::redirect::Redirect;
use crate::search_path::{Exclusions, SearchPath};
use std::path::PathBuf;

/// Final decision for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Legacy usage: print the redirect and exit non-zero.
    Block(Redirect),
    /// Run this binary with the original arguments.
    Delegate(PathBuf),
    /// Pass-through was selected but no real binary exists outside the shims.
    DelegateMissing(ShimName),
}

/// A resolution together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub rule: &'static str,
    pub resolution: Resolution,
}

pub struct Resolver {
    search_path: SearchPath,
    exclusions: Exclusions,
    config: ShimConfig,
    reentered: bool,
}

impl Resolver {
    pub fn new(search_path: SearchPath, exclusions: Exclusions, config: ShimConfig) -> Self {
        Self {
            search_path,
            exclusions,
            config,
            reentered: false,
        }
    }

    /// Marks this shim as having been started as another shim's delegate.
    /// Pass-through then reports `DelegateMissing` instead of looping.
    pub fn reentered(mut self, reentered: bool) -> Self {
        self.reentered = reentered;
        self
    }

    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    pub fn resolve(&self, invocation: &Invocation) -> Decision {
        let name = invocation.name();

        let Evaluation { rule, outcome } = PatternTable::for_shim(name).evaluate(invocation);

        let resolution = match outcome {
            Outcome::Block(redirect) => Resolution::Block(redirect),
            Outcome::PassThrough => self.delegate_for(name),
        };

        tracing::debug!(shim = %name, rule, resolution = ?resolution, "Resolved invocation");
        Decision { rule, resolution }
    }

    fn delegate_for(&self, name: ShimName) -> Resolution {
        if self.reentered {
            tracing::warn!(shim = %name, "Started as a delegate of another shim");
            return Resolution::DelegateMissing(name);
        }
        match self
            .search_path
            .find_excluding(name.as_str(), &self.exclusions)
        {
            Some(path) => Resolution::Delegate(path),
            None => Resolution::DelegateMissing(name),
        }
    }
}
