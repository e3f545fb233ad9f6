//! Redirect messages shown when a legacy invocation is blocked.
//!
//! ## Format
//!
//! ```text
//! legacy command detected: pip install requests
//!
//!   uv add requests                  # add to the project's dependencies
//!   uv run --with requests <command> # one-off, without touching the project
//! ```

use std::fmt;

/// A single replacement command with a short purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub command: String,
    pub purpose: &'static str,
}

impl Suggestion {
    pub fn new(command: impl Into<String>, purpose: &'static str) -> Self {
        Self {
            command: command.into(),
            purpose,
        }
    }
}

/// Guidance printed to stderr for a blocked invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub detected: String,
    pub suggestions: Vec<Suggestion>,
    pub note: Option<&'static str>,
}

impl Redirect {
    pub fn new(detected: impl Into<String>) -> Self {
        Self {
            detected: detected.into(),
            suggestions: Vec::new(),
            note: None,
        }
    }

    pub fn suggest(mut self, command: impl Into<String>, purpose: &'static str) -> Self {
        self.suggestions.push(Suggestion::new(command, purpose));
        self
    }

    pub fn note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// True if any suggestion's command contains `needle`.
    pub fn suggests(&self, needle: &str) -> bool {
        self.suggestions.iter().any(|s| s.command.contains(needle))
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "legacy command detected: {}", self.detected)?;

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            let width = self
                .suggestions
                .iter()
                .map(|s| s.command.chars().count())
                .max()
                .unwrap_or(0);
            for suggestion in &self.suggestions {
                writeln!(
                    f,
                    "  {:<width$} # {}",
                    suggestion.command,
                    suggestion.purpose,
                    width = width
                )?;
            }
        }

        if let Some(note) = self.note {
            writeln!(f)?;
            writeln!(f, "{note}")?;
        }
        Ok(())
    }
}
