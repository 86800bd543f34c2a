//! Error types for model registration and argument matching.
//!
//! Two families: [`DefinitionError`] is raised while the model is being
//! registered and must abort startup; [`MatchError`] (wrapped in a
//! [`DispatchError`] by the dispatcher) is raised per invocation and is
//! reported to the user.

use std::fmt;

use thiserror::Error;

/// What collided when a definition was rejected as a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// Another descriptor in the registry has the same `name`.
    Name,
    LongName,
    ShortName,
    /// A second variadic positional.
    Variadic,
    /// A sibling command already uses this name.
    CommandName,
    /// A sibling command already uses this alias.
    Alias,
    /// The registry was finalized; nothing more may be registered.
    Finalized,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Conflict::Name => "argument name already registered",
            Conflict::LongName => "long option already registered",
            Conflict::ShortName => "short option already registered",
            Conflict::Variadic => "only one variadic positional is allowed",
            Conflict::CommandName => "command name already used by a sibling",
            Conflict::Alias => "alias already used by a sibling",
            Conflict::Finalized => "registry is already finalized",
        };
        f.write_str(text)
    }
}

/// Registration-time errors. A model that produces one of these must never
/// run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("duplicate definition of '{name}': {conflict}")]
    DuplicateDefinition { name: String, conflict: Conflict },

    /// Structurally invalid descriptor or command.
    #[error("invalid definition of '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    #[error("invalid help format: {0}")]
    InvalidFormat(String),
}

impl DefinitionError {
    pub(crate) fn duplicate(name: &str, conflict: Conflict) -> Self {
        Self::DuplicateDefinition {
            name: name.to_string(),
            conflict,
        }
    }

    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parse-time errors produced while matching an argument vector.
///
/// Option-related variants carry the descriptor `name`; `UnknownOption`
/// carries the flag as typed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("unknown option '{0}'")]
    UnknownOption(OptionFlag),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("option '{0}' requires a value")]
    MissingValue(String),

    #[error("option '{0}' does not take a value")]
    UnexpectedValue(String),

    #[error("unexpected argument '{0}'")]
    UnexpectedPositional(String),

    #[error("missing required argument '{0}'")]
    MissingRequiredArgument(String),

    #[error("invalid value '{raw}' for '{name}': expected {expected}")]
    InvalidValue {
        name: String,
        raw: String,
        expected: String,
    },

    #[error("'{0}' cannot be used together with '{1}'")]
    ConflictingArguments(String, String),

    #[error("'{name}' requires '{requires}' to be supplied as well")]
    MissingDependency { name: String, requires: String },
}

/// A flag as the user typed it, without its dashes.
///
/// `"name".into()` gives the long form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionFlag {
    Long(String),
    Short(char),
}

impl fmt::Display for OptionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionFlag::Long(name) => write!(f, "--{name}"),
            OptionFlag::Short(short) => write!(f, "-{short}"),
        }
    }
}

impl From<&str> for OptionFlag {
    fn from(name: &str) -> Self {
        OptionFlag::Long(name.to_string())
    }
}

impl From<String> for OptionFlag {
    fn from(name: String) -> Self {
        OptionFlag::Long(name)
    }
}

impl From<char> for OptionFlag {
    fn from(short: char) -> Self {
        OptionFlag::Short(short)
    }
}

/// A [`MatchError`] tagged with the command path at which it occurred.
///
/// The path starts with the root command name and lists canonical command
/// names (never the alias the user typed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct DispatchError {
    pub path: Vec<String>,
    #[source]
    pub error: MatchError,
}

impl DispatchError {
    pub(crate) fn new(path: &[&str], error: MatchError) -> Self {
        Self {
            path: path.iter().map(|segment| segment.to_string()).collect(),
            error,
        }
    }
}
