//! Invocation parsing: which shim was called and with what arguments.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

/// The command names a shim can be invoked as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShimName {
    Python,
    Python3,
    Pip,
    Pip3,
    Pipx,
    Uv,
}

impl ShimName {
    pub const ALL: [ShimName; 6] = [
        ShimName::Python,
        ShimName::Python3,
        ShimName::Pip,
        ShimName::Pip3,
        ShimName::Pipx,
        ShimName::Uv,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShimName::Python => "python",
            ShimName::Python3 => "python3",
            ShimName::Pip => "pip",
            ShimName::Pip3 => "pip3",
            ShimName::Pipx => "pipx",
            ShimName::Uv => "uv",
        }
    }

    /// Exact, case-sensitive match on a bare command name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|shim| shim.as_str() == name)
    }

    /// Derives the shim name from `argv[0]`, which may be a bare name or a path.
    pub fn from_argv0(argv0: &OsStr) -> Option<Self> {
        let base = Path::new(argv0).file_name()?.to_str()?;
        Self::parse(base)
    }
}

impl fmt::Display for ShimName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One shim invocation: the invoked name and its argument vector.
///
/// `raw` is what gets handed to a delegate, byte-for-byte. `text` is a lossy
/// view used only for pattern matching and message rendering.
#[derive(Debug, Clone)]
pub struct Invocation {
    name: ShimName,
    raw: Vec<OsString>,
    text: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(name: ShimName, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let raw: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let text = raw
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        Self { name, raw, text }
    }

    pub fn name(&self) -> ShimName {
        self.name
    }

    pub fn args(&self) -> &[String] {
        &self.text
    }

    pub fn raw_args(&self) -> &[OsString] {
        &self.raw
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.text.get(index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Index of the first argument that does not start with `-`.
    pub fn first_positional(&self) -> Option<usize> {
        self.text.iter().position(|arg| !arg.starts_with('-'))
    }

    /// The command line as typed, for messages.
    pub fn command_line(&self) -> String {
        let mut words = vec![self.name.as_str()];
        words.extend(self.text.iter().map(String::as_str));
        shell_words::join(words)
    }
}
