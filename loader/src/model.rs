//! Serialized command models.
//!
//! A model file describes one root command and, recursively, its
//! sub-commands and their arguments. Every field except `name` is optional.
//!
//! # Example YAML
//!
//! ```yaml
//! name: todo
//! brief: Manage a todo list
//! commands:
//!   - name: add
//!     arguments:
//!       - name: title
//!       - name: priority
//!         kind: option
//!         type: enum
//!         choices: [low, high]
//!         default: low
//!   - name: list
//!     aliases: [ls]
//!     doc: |
//!       List items.
//!
//!       Parameters
//!       ----------
//!       all : bool
//!           Include finished items.
//!     arguments:
//!       - name: all
//!         kind: option
//!         type: boolean
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use command_model_core::{
    ArgumentDescriptor, ArgumentKind, Arity, CommandNode, DefinitionError, Value, ValueType,
};
use command_model_docstring::{DocDialect, NumpyDialect};

use crate::error::{LoadError, Result};
use crate::format::{self, FileFormat};

/// Value type names accepted in model files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeName {
    #[default]
    #[serde(alias = "str")]
    String,
    #[serde(alias = "int")]
    Integer,
    Float,
    #[serde(alias = "bool")]
    Boolean,
    /// Requires `choices`.
    #[serde(alias = "choice")]
    Enum,
}

/// One argument of a [`CommandSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: ArgumentKind,
    #[serde(rename = "type", default)]
    pub value_type: TypeName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<Arity>,
    /// Overrides the requiredness implied by kind, arity and default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// A scalar or list, or a string coerced through the value type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Long flag name replacing the kebab form of `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,
}

fn default_kind() -> ArgumentKind {
    ArgumentKind::Positional
}

/// One command of a [`ModelSpec`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epilog: Option<String>,
    /// Raw documentation parsed by the build dialect. Explicit fields win.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<CommandSpec>,
}

/// A serialized command tree: the root command.
///
/// # Examples
///
/// ```
/// use command_model_core::{CommandTree, Dispatch};
/// use command_model_loader::ModelSpec;
///
/// let model = ModelSpec::from_json(r#"{
///     "name": "fizzbuzz",
///     "arguments": [
///         { "name": "min", "type": "integer" },
///         { "name": "max", "type": "integer" },
///         { "name": "skip_empty", "kind": "option", "type": "boolean", "short": "s" }
///     ]
/// }"#).unwrap();
///
/// let tree = CommandTree::new(model.build().unwrap()).unwrap();
/// let Dispatch::Invoke { arguments, .. } = tree.resolve(["1", "15", "-s"]).unwrap() else {
///     panic!("expected a match");
/// };
/// assert_eq!(arguments.get_integer("max"), Some(15));
/// assert!(arguments.flag("skip_empty"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSpec {
    pub root: CommandSpec,
}

impl ModelSpec {
    /// Loads a model file, picking JSON or YAML by extension.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`], [`LoadError::Io`], or a
    /// parse error for the detected format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let model: Self = format::read(path)?;
        debug!(path = %path.display(), command = %model.root.name, "loaded model");
        Ok(model)
    }

    /// Writes the model, picking JSON or YAML by extension.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`], [`LoadError::Io`], or a
    /// serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        format::write(path.as_ref(), self)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        FileFormat::Json.parse(text)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        FileFormat::Yaml.parse(text)
    }

    /// Builds the not-yet-finalized command tree, applying `doc` fields with
    /// the numpydoc dialect.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Definition`] for the first registration conflict
    /// and [`LoadError::InvalidDefault`] for defaults that do not convert.
    pub fn build(&self) -> Result<CommandNode> {
        self.build_with(&NumpyDialect)
    }

    /// Like [`build`](Self::build), with an explicit documentation dialect.
    pub fn build_with(&self, dialect: &dyn DocDialect) -> Result<CommandNode> {
        self.root.build(dialect)
    }
}

impl CommandSpec {
    fn build(&self, dialect: &dyn DocDialect) -> Result<CommandNode> {
        let mut node = CommandNode::new(&self.name);
        for alias in &self.aliases {
            node = node.with_alias(alias);
        }
        if let Some(brief) = &self.brief {
            node.set_brief(brief);
        }
        if let Some(description) = &self.description {
            node.set_description(description);
        }
        if let Some(epilog) = &self.epilog {
            node.set_epilog(epilog);
        }

        for argument in &self.arguments {
            node.add_argument(argument.descriptor()?)?;
        }
        if let Some(doc) = &self.doc {
            let unmatched = dialect.parse(doc).apply(&mut node);
            for name in unmatched {
                debug!(command = %self.name, parameter = %name, "documented parameter has no argument");
            }
        }

        for command in &self.commands {
            node.add_child(command.build(dialect)?)?;
        }
        debug!(command = %self.name, arguments = self.arguments.len(), children = self.commands.len(), "built command");
        Ok(node)
    }
}

impl ArgumentSpec {
    /// Converts to a core descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Definition`] for a type/choices mismatch and
    /// [`LoadError::InvalidDefault`] for an unconvertible default.
    pub fn descriptor(&self) -> Result<ArgumentDescriptor> {
        let value_type = self.resolved_type()?;
        let mut descriptor = match self.kind {
            ArgumentKind::Positional => ArgumentDescriptor::positional(&self.name, value_type),
            ArgumentKind::Option => ArgumentDescriptor::option(&self.name, value_type),
        };
        if let Some(arity) = self.arity {
            descriptor = descriptor.with_arity(arity);
        }
        if let Some(default) = &self.default {
            if let Some(value) = self.default_value(default, &descriptor)? {
                descriptor = descriptor.with_default(value);
            }
        }
        descriptor = match self.required {
            Some(true) => descriptor.required(),
            Some(false) => descriptor.optional(),
            None => descriptor,
        };
        if let Some(rename) = &self.rename {
            descriptor = descriptor.with_rename(rename);
        }
        if let Some(short) = self.short {
            descriptor = descriptor.with_short(short);
        }
        if let Some(help) = &self.help {
            descriptor = descriptor.with_help(help);
        }
        for other in &self.requires {
            descriptor = descriptor.requires(other);
        }
        for other in &self.conflicts_with {
            descriptor = descriptor.conflicts_with(other);
        }
        Ok(descriptor)
    }

    fn resolved_type(&self) -> Result<ValueType> {
        let value_type = match (self.value_type, self.choices.is_empty()) {
            (TypeName::String | TypeName::Enum, false) => ValueType::Enum(self.choices.clone()),
            (TypeName::String, true) => ValueType::String,
            (TypeName::Integer, true) => ValueType::Integer,
            (TypeName::Float, true) => ValueType::Float,
            (TypeName::Boolean, true) => ValueType::Boolean,
            (TypeName::Enum, true) => return Err(self.invalid("enum type needs choices")),
            (_, false) => return Err(self.invalid("choices require type string or enum")),
        };
        Ok(value_type)
    }

    fn default_value(
        &self,
        raw: &serde_json::Value,
        descriptor: &ArgumentDescriptor,
    ) -> Result<Option<Value>> {
        if raw.is_null() {
            return Ok(None);
        }
        let value_type = &descriptor.value_type;
        if descriptor.arity.is_variadic() {
            let items = match raw {
                serde_json::Value::Array(items) => items.as_slice(),
                single => std::slice::from_ref(single),
            };
            let values = items
                .iter()
                .map(|item| self.scalar(item, value_type))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Some(Value::List(values)));
        }
        self.scalar(raw, value_type).map(Some)
    }

    fn scalar(&self, raw: &serde_json::Value, value_type: &ValueType) -> Result<Value> {
        let value = match raw {
            serde_json::Value::String(text) => value_type.coerce(text),
            serde_json::Value::Bool(flag) => Some(Value::Boolean(*flag)),
            serde_json::Value::Number(number) => match value_type {
                ValueType::Float => number.as_f64().map(Value::Float),
                _ => number
                    .as_i64()
                    .map(Value::Integer)
                    .or_else(|| number.as_f64().map(Value::Float)),
            },
            _ => None,
        };
        value
            .filter(|value| value_type.accepts(value))
            .ok_or_else(|| LoadError::InvalidDefault {
                argument: self.name.clone(),
                reason: format!("'{raw}' is not a valid {value_type}"),
            })
    }

    fn invalid(&self, reason: &str) -> LoadError {
        LoadError::Definition(DefinitionError::InvalidDefinition {
            name: self.name.clone(),
            reason: reason.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argument(json: serde_json::Value) -> ArgumentSpec {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_argument_defaults_to_required_string_positional() {
        let descriptor = argument(serde_json::json!({ "name": "title" }))
            .descriptor()
            .unwrap();
        assert_eq!(descriptor.kind, ArgumentKind::Positional);
        assert_eq!(descriptor.value_type, ValueType::String);
        assert!(descriptor.required);
    }

    #[test]
    fn test_boolean_option_is_a_flag() {
        let descriptor = argument(serde_json::json!({
            "name": "dry_run", "kind": "option", "type": "bool", "short": "n"
        }))
        .descriptor()
        .unwrap();
        assert!(!descriptor.takes_value());
        assert_eq!(descriptor.long_name, "dry-run");
        assert_eq!(descriptor.short_name, Some('n'));
    }

    #[test]
    fn test_choices_make_an_enum() {
        let descriptor = argument(serde_json::json!({
            "name": "level", "kind": "option", "choices": ["low", "high"], "default": "low"
        }))
        .descriptor()
        .unwrap();
        assert_eq!(
            descriptor.value_type,
            ValueType::Enum(vec!["low".into(), "high".into()])
        );
        assert_eq!(descriptor.default, Some(Value::from("low")));

        let err = argument(serde_json::json!({
            "name": "level", "type": "integer", "choices": ["1"]
        }))
        .descriptor()
        .unwrap_err();
        assert!(matches!(err, LoadError::Definition(_)));
    }

    #[test]
    fn test_default_conversion() {
        let float = argument(serde_json::json!({
            "name": "ratio", "type": "float", "default": 2
        }))
        .descriptor()
        .unwrap();
        assert_eq!(float.default, Some(Value::Float(2.0)));
        assert!(!float.required);

        let coerced = argument(serde_json::json!({
            "name": "count", "kind": "option", "type": "integer", "default": "10"
        }))
        .descriptor()
        .unwrap();
        assert_eq!(coerced.default, Some(Value::Integer(10)));

        let list = argument(serde_json::json!({
            "name": "tags", "kind": "option", "arity": "zero_or_more", "default": ["a", "b"]
        }))
        .descriptor()
        .unwrap();
        assert_eq!(
            list.default,
            Some(Value::List(vec![Value::from("a"), Value::from("b")]))
        );

        let err = argument(serde_json::json!({
            "name": "count", "type": "integer", "default": "ten"
        }))
        .descriptor()
        .unwrap_err();
        assert!(matches!(err, LoadError::InvalidDefault { ref argument, .. } if argument == "count"));
    }

    #[test]
    fn test_build_applies_doc_without_overriding_explicit_fields() {
        let model = ModelSpec::from_yaml(
            r#"
name: serve
brief: Explicit brief
doc: |
  Documented brief.

  Parameters
  ----------
  port : int
      Port to listen on.
arguments:
  - name: port
    kind: option
    type: int
"#,
        )
        .unwrap();
        let node = model.build().unwrap();
        assert_eq!(node.brief(), Some("Explicit brief"));
        assert_eq!(
            node.registry().get("port").unwrap().help_text.as_deref(),
            Some("Port to listen on.")
        );
        assert!(!node.is_finalized());
    }

    #[test]
    fn test_build_surfaces_duplicate_aliases() {
        let model = ModelSpec::from_json(
            r#"{ "name": "app", "commands": [
                { "name": "list", "aliases": ["ls"] },
                { "name": "ls" }
            ] }"#,
        )
        .unwrap();
        assert!(matches!(
            model.build(),
            Err(LoadError::Definition(DefinitionError::DuplicateDefinition { .. }))
        ));
    }
}
