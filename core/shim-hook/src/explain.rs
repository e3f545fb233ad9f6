//! Dry-run view of the interception policy.
//!
//! ```bash
//! shim-hook explain pip install requests
//! ```
//!
//! Prints the matched rule and what the shim would do. Nothing is executed.

use crate::HookError;
use shim_core::config::shim_dir_override;
use shim_core::{
    Invocation, Resolution, Resolver, SearchPath, ShimConfig, ShimDirSpec, ShimName,
    EXIT_DELEGATE_NOT_FOUND,
};

pub fn run(command: &str, args: &[String]) -> Result<(), HookError> {
    let name =
        ShimName::parse(command).ok_or_else(|| HookError::UnknownShim(command.to_string()))?;

    // Same exclusions the installed shim computes for itself.
    let exclusions = ShimDirSpec {
        anchor: crate::hook_dir()?,
        requested: shim_dir_override(),
    }
    .exclusions(&crate::sibling_shim_binary()?);

    let resolver = Resolver::new(SearchPath::from_env(), exclusions, ShimConfig::load());
    let invocation = Invocation::new(name, args.iter().map(String::as_str));
    let decision = resolver.resolve(&invocation);

    println!("command: {}", invocation.command_line());
    println!("rule:    {}", decision.rule);
    match decision.resolution {
        Resolution::Block(redirect) => {
            println!(
                "outcome: block (exit {})",
                resolver.config().blocked_exit_code()
            );
            println!();
            print!("{redirect}");
        }
        Resolution::Delegate(program) => {
            println!("outcome: pass through to {}", program.display());
        }
        Resolution::DelegateMissing(name) => {
            println!(
                "outcome: real {name} binary not found (exit {EXIT_DELEGATE_NOT_FOUND})"
            );
        }
    }
    Ok(())
}
