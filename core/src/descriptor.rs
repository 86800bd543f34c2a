//! Argument descriptors: one parameter of one command.
//!
//! A descriptor is either a positional (bound by position) or an option
//! (bound by `--long` or `-s` flag). Construct them with
//! [`ArgumentDescriptor::positional`], [`ArgumentDescriptor::option`] or
//! [`ArgumentDescriptor::flag`] and chain the `with_*` builders.

use serde::{Deserialize, Serialize};

use crate::value::{Value, ValueType};

/// Whether an argument is identified by position or by flag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    Positional,
    Option,
}

/// How many values a descriptor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// Exactly one value (the default).
    #[default]
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Arity {
    /// Returns `true` for arities that collect a list of values.
    pub fn is_variadic(self) -> bool {
        matches!(self, Arity::ZeroOrMore | Arity::OneOrMore)
    }

    /// Minimum number of values this arity demands.
    pub fn min(self) -> usize {
        match self {
            Arity::One | Arity::OneOrMore => 1,
            Arity::ZeroOrOne | Arity::ZeroOrMore => 0,
        }
    }
}

/// Schema for a single command parameter.
///
/// # Examples
///
/// ```
/// use command_model_core::{ArgumentDescriptor, ArgumentKind, ValueType};
///
/// let min = ArgumentDescriptor::positional("min", ValueType::Integer);
/// assert_eq!(min.kind, ArgumentKind::Positional);
/// assert!(min.required);
///
/// let skip = ArgumentDescriptor::flag("skip_empty").with_short('s');
/// assert_eq!(skip.long_name, "skip-empty");
/// assert_eq!(skip.short_name, Some('s'));
/// assert!(!skip.takes_value());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    /// Identifier, unique within the owning registry. Key in
    /// [`BoundArguments`](crate::BoundArguments).
    pub name: String,
    pub kind: ArgumentKind,
    pub value_type: ValueType,
    pub arity: Arity,
    pub required: bool,
    /// Pre-coerced value used when the argument is absent.
    pub default: Option<Value>,
    /// Flag name without the leading `--`.
    pub long_name: String,
    /// Single-character alias, never inferred.
    pub short_name: Option<char>,
    pub help_text: Option<String>,
    /// Option names that must also be supplied when this one is.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Option names that must not be supplied together with this one.
    #[serde(default)]
    pub conflicts_with: Vec<String>,
}

impl ArgumentDescriptor {
    fn new(name: &str, kind: ArgumentKind, value_type: ValueType, required: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            value_type,
            arity: Arity::One,
            required,
            default: None,
            long_name: kebab_case(name),
            short_name: None,
            help_text: None,
            requires: Vec::new(),
            conflicts_with: Vec::new(),
        }
    }

    /// Creates a required positional taking exactly one value.
    pub fn positional(name: &str, value_type: ValueType) -> Self {
        Self::new(name, ArgumentKind::Positional, value_type, true)
    }

    /// Creates an optional option taking one value.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_model_core::{ArgumentDescriptor, ValueType};
    ///
    /// let port = ArgumentDescriptor::option("port", ValueType::Integer);
    /// assert!(port.takes_value());
    /// assert!(!port.required);
    /// ```
    pub fn option(name: &str, value_type: ValueType) -> Self {
        Self::new(name, ArgumentKind::Option, value_type, false)
    }

    /// Creates a boolean option, a zero-argument flag.
    pub fn flag(name: &str) -> Self {
        Self::new(name, ArgumentKind::Option, ValueType::Boolean, false)
    }

    /// Sets the single-character alias (`-s`).
    pub fn with_short(mut self, short: char) -> Self {
        self.short_name = Some(short);
        self
    }

    /// Overrides the long flag name derived from `name`.
    pub fn with_rename(mut self, long_name: &str) -> Self {
        self.long_name = long_name.to_string();
        self
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help_text = Some(help.to_string());
        self
    }

    /// Sets the default. A positional with a default is no longer required.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        if self.kind == ArgumentKind::Positional {
            self.required = false;
        }
        self
    }

    /// Sets the arity. For positionals, requiredness follows the arity's
    /// minimum unless a default is present.
    pub fn with_arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        if self.kind == ArgumentKind::Positional {
            self.required = arity.min() > 0 && self.default.is_none();
        }
        self
    }

    /// Marks the argument as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the argument as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn requires(mut self, other: &str) -> Self {
        self.requires.push(other.to_string());
        self
    }

    pub fn conflicts_with(mut self, other: &str) -> Self {
        self.conflicts_with.push(other.to_string());
        self
    }

    pub fn is_positional(&self) -> bool {
        self.kind == ArgumentKind::Positional
    }

    pub fn is_option(&self) -> bool {
        self.kind == ArgumentKind::Option
    }

    /// Returns `true` unless this is a boolean option (a flag).
    pub fn takes_value(&self) -> bool {
        !(self.is_option() && self.value_type == ValueType::Boolean)
    }

    /// Placeholder shown for the value in usage and help output, e.g.
    /// `<port>`, `<json|yaml>` or `<file>...`.
    pub fn value_placeholder(&self) -> String {
        let inner = match &self.value_type {
            ValueType::Enum(variants) => variants.join("|"),
            _ if self.is_positional() => self.name.clone(),
            _ => self.long_name.clone(),
        };
        if self.arity.is_variadic() {
            format!("<{inner}>...")
        } else {
            format!("<{inner}>")
        }
    }
}

/// Converts a snake_case identifier into the kebab-case flag form.
pub fn kebab_case(name: &str) -> String {
    name.replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_requiredness_follows_arity_and_default() {
        let files = ArgumentDescriptor::positional("files", ValueType::String)
            .with_arity(Arity::ZeroOrMore);
        assert!(!files.required);

        let files = ArgumentDescriptor::positional("files", ValueType::String)
            .with_arity(Arity::OneOrMore);
        assert!(files.required);

        let count = ArgumentDescriptor::positional("count", ValueType::Integer).with_default(3_i64);
        assert!(!count.required);
        assert_eq!(count.default, Some(Value::Integer(3)));
    }

    #[test]
    fn test_long_name_is_kebab_unless_renamed() {
        let opt = ArgumentDescriptor::option("dry_run_mode", ValueType::String);
        assert_eq!(opt.long_name, "dry-run-mode");

        let opt = opt.with_rename("dry");
        assert_eq!(opt.long_name, "dry");
        assert_eq!(opt.name, "dry_run_mode");
    }

    #[test]
    fn test_value_placeholder() {
        let format = ArgumentDescriptor::option(
            "format",
            ValueType::Enum(vec!["json".into(), "yaml".into()]),
        );
        assert_eq!(format.value_placeholder(), "<json|yaml>");

        let tags = ArgumentDescriptor::option("tag_name", ValueType::String)
            .with_arity(Arity::ZeroOrMore);
        assert_eq!(tags.value_placeholder(), "<tag-name>...");
    }

    #[test]
    fn test_boolean_positional_takes_value() {
        let toggle = ArgumentDescriptor::positional("enabled", ValueType::Boolean);
        assert!(toggle.takes_value());
        assert!(!ArgumentDescriptor::flag("all").takes_value());
    }
}
