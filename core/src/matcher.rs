//! Matching a token stream against one command's registry.
//!
//! [`bind`] walks the tokens once, collecting raw strings per descriptor,
//! then checks requiredness, coerces every value and finally validates
//! option relationships. Nothing is exposed unless every step succeeds.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::iter::Peekable;

use serde::Serialize;
use tracing::{debug, trace};

use crate::descriptor::ArgumentDescriptor;
use crate::error::MatchError;
use crate::registry::ArgumentRegistry;
use crate::tokenizer::Token;
use crate::value::Value;

/// Coerced values of one successful match, keyed by descriptor `name`.
///
/// Absent optional arguments without a default have no entry; absent flags
/// bind `false` and absent variadics bind an empty list.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct BoundArguments {
    values: BTreeMap<String, Value>,
}

impl BoundArguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_integer)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    /// Returns the boolean bound to `name`, `false` when absent.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn get_list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a successful walk over the tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Arguments(BoundArguments),
    /// The help flag was seen; nothing was bound.
    HelpRequested,
}

/// Matches `tokens` against a finalized `registry`.
///
/// # Errors
///
/// Any [`MatchError`] except `UnknownCommand`, which only the dispatcher
/// raises.
///
/// # Examples
///
/// ```
/// use command_model_core::*;
///
/// let mut registry = ArgumentRegistry::new();
/// registry.register(ArgumentDescriptor::positional("min", ValueType::Integer)).unwrap();
/// registry.register(ArgumentDescriptor::positional("max", ValueType::Integer)).unwrap();
/// registry
///     .register(ArgumentDescriptor::flag("skip_empty").with_short('s').with_default(false))
///     .unwrap();
/// registry.finalize().unwrap();
///
/// let Binding::Arguments(bound) = bind(&registry, tokenize(["1", "15", "-s"])).unwrap() else {
///     panic!("expected arguments");
/// };
/// assert_eq!(bound.get_integer("min"), Some(1));
/// assert_eq!(bound.get_integer("max"), Some(15));
/// assert!(bound.flag("skip_empty"));
///
/// assert_eq!(
///     bind(&registry, tokenize(["1"])),
///     Err(MatchError::MissingRequiredArgument("max".into()))
/// );
/// ```
pub fn bind<I>(registry: &ArgumentRegistry, tokens: I) -> Result<Binding, MatchError>
where
    I: IntoIterator<Item = Token>,
{
    debug_assert!(registry.is_finalized(), "matching against an unfinalized registry");

    let mut collector = Collector::new(registry);
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next() {
        trace!(token = ?token, "matching token");
        match token {
            Token::Separator => {}
            Token::Positional(text) => collector.positional(text)?,
            Token::LongOption { name, value } => {
                let descriptor = registry
                    .find_long(&name)
                    .ok_or_else(|| MatchError::UnknownOption(name.into()))?;
                if registry.is_help(descriptor) {
                    return Ok(Binding::HelpRequested);
                }
                collector.option(descriptor, value, &mut tokens)?;
            }
            Token::ShortCluster { flags, mut value } => {
                if flags.is_empty() {
                    // `-=value`
                    return Err(MatchError::UnknownOption('='.into()));
                }
                let count = flags.chars().count();
                for (position, short) in flags.chars().enumerate() {
                    let descriptor = registry
                        .find_short(short)
                        .ok_or_else(|| MatchError::UnknownOption(short.into()))?;
                    if registry.is_help(descriptor) {
                        return Ok(Binding::HelpRequested);
                    }
                    let last = position + 1 == count;
                    if !last && descriptor.takes_value() {
                        return Err(MatchError::UnexpectedValue(descriptor.name.clone()));
                    }
                    let inline = if last { value.take() } else { None };
                    collector.option(descriptor, inline, &mut tokens)?;
                }
            }
        }
    }

    let bound = collector.finish()?;
    debug!(arguments = bound.len(), "bound arguments");
    Ok(Binding::Arguments(bound))
}

/// Raw strings gathered during the token walk.
struct Collector<'r> {
    registry: &'r ArgumentRegistry,
    raw: HashMap<&'r str, Vec<String>>,
    flags: HashSet<&'r str>,
    /// Options the user typed explicitly; defaults never count.
    supplied: HashSet<&'r str>,
    next_slot: usize,
}

impl<'r> Collector<'r> {
    fn new(registry: &'r ArgumentRegistry) -> Self {
        Self {
            registry,
            raw: HashMap::new(),
            flags: HashSet::new(),
            supplied: HashSet::new(),
            next_slot: 0,
        }
    }

    fn positional(&mut self, text: String) -> Result<(), MatchError> {
        let registry = self.registry;
        let Some(descriptor) = registry.positional(self.next_slot) else {
            return Err(MatchError::UnexpectedPositional(text));
        };
        let values = self.raw.entry(descriptor.name.as_str()).or_default();
        values.push(text);
        if !descriptor.arity.is_variadic() {
            self.next_slot += 1;
        }
        Ok(())
    }

    fn option<I>(
        &mut self,
        descriptor: &'r ArgumentDescriptor,
        inline: Option<String>,
        tokens: &mut Peekable<I>,
    ) -> Result<(), MatchError>
    where
        I: Iterator<Item = Token>,
    {
        let name = descriptor.name.as_str();
        self.supplied.insert(name);

        if !descriptor.takes_value() {
            if inline.is_some() {
                return Err(MatchError::UnexpectedValue(name.to_string()));
            }
            self.flags.insert(name);
            return Ok(());
        }

        let raw = match inline {
            Some(value) => value,
            None => match tokens.next_if(Token::is_positional) {
                Some(Token::Positional(text)) => text,
                _ => return Err(MatchError::MissingValue(name.to_string())),
            },
        };

        let values = self.raw.entry(name).or_default();
        if !descriptor.arity.is_variadic() {
            values.clear();
        }
        values.push(raw);
        Ok(())
    }

    fn finish(mut self) -> Result<BoundArguments, MatchError> {
        let registry = self.registry;

        for descriptor in registry.positionals() {
            if descriptor.required && !self.raw.contains_key(descriptor.name.as_str()) {
                return Err(MatchError::MissingRequiredArgument(descriptor.name.clone()));
            }
        }
        for descriptor in registry.options() {
            let name = descriptor.name.as_str();
            if descriptor.required && descriptor.default.is_none() && !self.supplied.contains(name) {
                return Err(MatchError::MissingRequiredArgument(descriptor.name.clone()));
            }
        }

        let mut values = BTreeMap::new();
        for descriptor in registry.descriptors() {
            if registry.is_help(descriptor) {
                continue;
            }
            let name = descriptor.name.as_str();
            let value = if !descriptor.takes_value() {
                if self.flags.contains(name) {
                    Value::Boolean(true)
                } else {
                    descriptor.default.clone().unwrap_or(Value::Boolean(false))
                }
            } else if let Some(mut raws) = self.raw.remove(name) {
                if descriptor.arity.is_variadic() {
                    let items = raws
                        .iter()
                        .map(|raw| coerce(descriptor, raw))
                        .collect::<Result<Vec<_>, _>>()?;
                    Value::List(items)
                } else {
                    // Single-valued slots hold exactly one raw string.
                    let raw = raws.pop().unwrap_or_default();
                    coerce(descriptor, &raw)?
                }
            } else if let Some(default) = &descriptor.default {
                default.clone()
            } else if descriptor.arity.is_variadic() {
                Value::List(Vec::new())
            } else {
                continue;
            };
            values.insert(descriptor.name.clone(), value);
        }

        self.check_relationships()?;
        Ok(BoundArguments { values })
    }

    fn check_relationships(&self) -> Result<(), MatchError> {
        for descriptor in self.registry.options() {
            let name = descriptor.name.as_str();
            if !self.supplied.contains(name) {
                continue;
            }
            if let Some(other) = descriptor
                .conflicts_with
                .iter()
                .find(|other| self.supplied.contains(other.as_str()))
            {
                return Err(MatchError::ConflictingArguments(name.to_string(), other.clone()));
            }
            if let Some(missing) = descriptor
                .requires
                .iter()
                .find(|other| !self.supplied.contains(other.as_str()))
            {
                return Err(MatchError::MissingDependency {
                    name: name.to_string(),
                    requires: missing.clone(),
                });
            }
        }
        Ok(())
    }
}

fn coerce(descriptor: &ArgumentDescriptor, raw: &str) -> Result<Value, MatchError> {
    descriptor
        .value_type
        .coerce(raw)
        .ok_or_else(|| MatchError::InvalidValue {
            name: descriptor.name.clone(),
            raw: raw.to_string(),
            expected: descriptor.value_type.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HelpFlag;
    use crate::descriptor::Arity;
    use crate::error::OptionFlag;
    use crate::tokenizer::tokenize;
    use crate::value::ValueType;

    fn registry(descriptors: Vec<ArgumentDescriptor>) -> ArgumentRegistry {
        let mut registry = ArgumentRegistry::new();
        for descriptor in descriptors {
            registry.register(descriptor).unwrap();
        }
        registry.inject_help(&HelpFlag::default());
        registry.finalize().unwrap();
        registry
    }

    fn fizzbuzz() -> ArgumentRegistry {
        registry(vec![
            ArgumentDescriptor::positional("min", ValueType::Integer),
            ArgumentDescriptor::positional("max", ValueType::Integer),
            ArgumentDescriptor::flag("skip_empty")
                .with_short('s')
                .with_default(false),
        ])
    }

    fn bound(registry: &ArgumentRegistry, args: &[&str]) -> BoundArguments {
        match bind(registry, tokenize(args)) {
            Ok(Binding::Arguments(bound)) => bound,
            other => panic!("expected bound arguments, got {other:?}"),
        }
    }

    fn error(registry: &ArgumentRegistry, args: &[&str]) -> MatchError {
        bind(registry, tokenize(args)).unwrap_err()
    }

    #[test]
    fn test_fizzbuzz_scenario() {
        let registry = fizzbuzz();
        let args = bound(&registry, &["1", "15", "-s"]);
        assert_eq!(args.get("min"), Some(&Value::Integer(1)));
        assert_eq!(args.get("max"), Some(&Value::Integer(15)));
        assert_eq!(args.get("skip_empty"), Some(&Value::Boolean(true)));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_missing_required_positional() {
        let registry = fizzbuzz();
        assert_eq!(
            error(&registry, &["1"]),
            MatchError::MissingRequiredArgument("max".into())
        );
    }

    #[test]
    fn test_unknown_options() {
        let registry = fizzbuzz();
        assert_eq!(
            error(&registry, &["--unknown"]),
            MatchError::UnknownOption("unknown".into())
        );
        assert_eq!(
            error(&registry, &["1", "2", "-sq"]),
            MatchError::UnknownOption('q'.into())
        );
        assert_eq!(
            error(&registry, &["1", "2", "--q"]),
            MatchError::UnknownOption(OptionFlag::Long("q".into()))
        );
    }

    #[test]
    fn test_flag_absent_uses_default_or_false() {
        let registry = registry(vec![
            ArgumentDescriptor::flag("all"),
            ArgumentDescriptor::flag("color").with_default(true),
        ]);
        let args = bound(&registry, &[]);
        assert!(!args.flag("all"));
        assert!(args.flag("color"));
        assert!(!args.contains("help"));

        let args = bound(&registry, &["--all"]);
        assert!(args.flag("all"));
    }

    #[test]
    fn test_flag_rejects_inline_value() {
        let registry = fizzbuzz();
        assert_eq!(
            error(&registry, &["1", "2", "--skip-empty=yes"]),
            MatchError::UnexpectedValue("skip_empty".into())
        );
        assert_eq!(
            error(&registry, &["1", "2", "-s=1"]),
            MatchError::UnexpectedValue("skip_empty".into())
        );
    }

    #[test]
    fn test_option_values_inline_and_following() {
        let registry = registry(vec![
            ArgumentDescriptor::option("host", ValueType::String),
            ArgumentDescriptor::option("port", ValueType::Integer).with_short('p'),
        ]);
        let args = bound(&registry, &["--host", "0.0.0.0", "--port=8080"]);
        assert_eq!(args.get_str("host"), Some("0.0.0.0"));
        assert_eq!(args.get_integer("port"), Some(8080));

        let args = bound(&registry, &["-p", "-1"]);
        assert_eq!(args.get_integer("port"), Some(-1));

        let args = bound(&registry, &["-p9000"]);
        assert_eq!(args.get_integer("port"), Some(9000));
    }

    #[test]
    fn test_missing_value_does_not_swallow_options() {
        let registry = registry(vec![
            ArgumentDescriptor::option("host", ValueType::String),
            ArgumentDescriptor::flag("verbose"),
        ]);
        assert_eq!(
            error(&registry, &["--host", "--verbose"]),
            MatchError::MissingValue("host".into())
        );
        assert_eq!(
            error(&registry, &["--host"]),
            MatchError::MissingValue("host".into())
        );
        assert_eq!(
            error(&registry, &["--host", "--", "x"]),
            MatchError::MissingValue("host".into())
        );
    }

    #[test]
    fn test_cluster_value_only_on_last_flag() {
        let registry = registry(vec![
            ArgumentDescriptor::flag("verbose").with_short('v'),
            ArgumentDescriptor::option("count", ValueType::Integer).with_short('n'),
        ]);
        let args = bound(&registry, &["-vn", "3"]);
        assert!(args.flag("verbose"));
        assert_eq!(args.get_integer("count"), Some(3));

        let args = bound(&registry, &["-vn=4"]);
        assert_eq!(args.get_integer("count"), Some(4));

        assert_eq!(
            error(&registry, &["-nv", "3"]),
            MatchError::UnexpectedValue("count".into())
        );
    }

    #[test]
    fn test_separator_forces_positionals() {
        let registry = registry(vec![
            ArgumentDescriptor::flag("all"),
            ArgumentDescriptor::positional("files", ValueType::String)
                .with_arity(Arity::ZeroOrMore),
        ]);
        let args = bound(&registry, &["a", "--", "--all", "-h"]);
        assert!(!args.flag("all"));
        assert_eq!(
            args.get_list("files"),
            Some(&[Value::from("a"), Value::from("--all"), Value::from("-h")][..])
        );
    }

    #[test]
    fn test_unexpected_positional() {
        let registry = fizzbuzz();
        assert_eq!(
            error(&registry, &["1", "2", "3"]),
            MatchError::UnexpectedPositional("3".into())
        );
    }

    #[test]
    fn test_variadic_boundaries() {
        let optional = registry(vec![
            ArgumentDescriptor::positional("files", ValueType::String)
                .with_arity(Arity::ZeroOrMore),
        ]);
        assert_eq!(bound(&optional, &[]).get_list("files"), Some(&[][..]));

        let required = registry(vec![
            ArgumentDescriptor::positional("files", ValueType::String)
                .with_arity(Arity::OneOrMore),
        ]);
        assert_eq!(
            error(&required, &[]),
            MatchError::MissingRequiredArgument("files".into())
        );
    }

    #[test]
    fn test_optional_positional_default_and_absence() {
        let registry = registry(vec![
            ArgumentDescriptor::positional("source", ValueType::String),
            ArgumentDescriptor::positional("count", ValueType::Integer).with_default(10_i64),
            ArgumentDescriptor::positional("label", ValueType::String)
                .with_arity(Arity::ZeroOrOne),
        ]);
        let args = bound(&registry, &["a"]);
        assert_eq!(args.get_integer("count"), Some(10));
        assert!(!args.contains("label"));

        let args = bound(&registry, &["a", "3", "x"]);
        assert_eq!(args.get_integer("count"), Some(3));
        assert_eq!(args.get_str("label"), Some("x"));
    }

    #[test]
    fn test_invalid_values() {
        let registry = registry(vec![
            ArgumentDescriptor::positional("count", ValueType::Integer),
            ArgumentDescriptor::option(
                "level",
                ValueType::Enum(vec!["low".into(), "high".into()]),
            ),
        ]);
        assert_eq!(
            error(&registry, &["many"]),
            MatchError::InvalidValue {
                name: "count".into(),
                raw: "many".into(),
                expected: "integer".into(),
            }
        );
        assert_eq!(
            error(&registry, &["1", "--level", "High"]),
            MatchError::InvalidValue {
                name: "level".into(),
                raw: "High".into(),
                expected: "one of [low, high]".into(),
            }
        );
    }

    #[test]
    fn test_missing_check_precedes_coercion() {
        let registry = fizzbuzz();
        assert_eq!(
            error(&registry, &["x"]),
            MatchError::MissingRequiredArgument("max".into())
        );
    }

    #[test]
    fn test_required_option() {
        let registry = registry(vec![
            ArgumentDescriptor::option("url", ValueType::String).required(),
        ]);
        assert_eq!(
            error(&registry, &[]),
            MatchError::MissingRequiredArgument("url".into())
        );
        assert_eq!(bound(&registry, &["--url", "x"]).get_str("url"), Some("x"));
    }

    #[test]
    fn test_repeatable_option_accumulates() {
        let registry = registry(vec![
            ArgumentDescriptor::option("tag", ValueType::String)
                .with_short('t')
                .with_arity(Arity::ZeroOrMore),
            ArgumentDescriptor::option("name", ValueType::String),
        ]);
        let args = bound(&registry, &["--tag", "a", "-t", "b", "--name", "x", "--name", "y"]);
        assert_eq!(
            args.get_list("tag"),
            Some(&[Value::from("a"), Value::from("b")][..])
        );
        assert_eq!(args.get_str("name"), Some("y"));

        let args = bound(&registry, &[]);
        assert_eq!(args.get_list("tag"), Some(&[][..]));
    }

    #[test]
    fn test_help_short_circuits_before_required_checks() {
        let registry = fizzbuzz();
        assert_eq!(bind(&registry, tokenize(["--help"])), Ok(Binding::HelpRequested));
        assert_eq!(bind(&registry, tokenize(["1", "-sh"])), Ok(Binding::HelpRequested));
        // Errors earlier in the stream still win.
        assert_eq!(
            error(&registry, &["--nope", "--help"]),
            MatchError::UnknownOption("nope".into())
        );
    }

    #[test]
    fn test_relationships() {
        let registry = registry(vec![
            ArgumentDescriptor::flag("verbose").conflicts_with("quiet"),
            ArgumentDescriptor::flag("quiet"),
            ArgumentDescriptor::option("password", ValueType::String).requires("user"),
            ArgumentDescriptor::option("user", ValueType::String),
        ]);
        assert_eq!(
            error(&registry, &["--verbose", "--quiet"]),
            MatchError::ConflictingArguments("verbose".into(), "quiet".into())
        );
        assert_eq!(
            error(&registry, &["--password", "x"]),
            MatchError::MissingDependency {
                name: "password".into(),
                requires: "user".into(),
            }
        );
        let args = bound(&registry, &["--password", "x", "--user", "me", "--quiet"]);
        assert_eq!(args.get_str("user"), Some("me"));
    }

    #[test]
    fn test_matching_is_idempotent() {
        let registry = fizzbuzz();
        let first = bind(&registry, tokenize(["3", "9"]));
        let second = bind(&registry, tokenize(["3", "9"]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_bound_arguments_serialize_as_map() {
        let registry = fizzbuzz();
        let args = bound(&registry, &["1", "15"]);
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "max": 15, "min": 1, "skip_empty": false })
        );
    }
}
