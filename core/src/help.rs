//! Help text rendering.
//!
//! Output sections, in order: brief, description, usage, `Options:`,
//! `Arguments:`, `Commands:`, epilog. Empty sections are omitted. Sections
//! are separated by a blank line unless [`FormatConfig::compact`] is set.

use serde::{Deserialize, Serialize};

use crate::command::CommandNode;
use crate::descriptor::{ArgumentDescriptor, Arity};
use crate::error::DefinitionError;
use crate::value::Value;

/// Help formatter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Wrap column.
    pub width: usize,
    /// Width of the name column; `width / 4` when unset.
    pub name_column_width: Option<usize>,
    /// Spaces before each item in a section.
    pub indent: usize,
    /// Suffix marking a name truncated to fit the name column.
    pub placeholder: String,
    /// Drop every blank line from the output.
    pub compact: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            width: 80,
            name_column_width: None,
            indent: 2,
            placeholder: "[...]".to_string(),
            compact: false,
        }
    }
}

impl FormatConfig {
    pub fn name_column(&self) -> usize {
        self.name_column_width.unwrap_or(self.width / 4)
    }

    /// Checks that a full-width name, its indent, the placeholder and the
    /// two-space gutter fit in `width`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidFormat`] when they do not, or when
    /// the name column cannot hold the placeholder.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_model_core::FormatConfig;
    ///
    /// assert!(FormatConfig::default().validate().is_ok());
    ///
    /// let narrow = FormatConfig { width: 20, name_column_width: Some(15), ..FormatConfig::default() };
    /// assert!(narrow.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let placeholder = self.placeholder.chars().count();
        let minimum = self.name_column() + self.indent + placeholder + 2;
        if self.width < minimum {
            return Err(DefinitionError::InvalidFormat(format!(
                "width must be at least {minimum}, got {}",
                self.width
            )));
        }
        if self.name_column() < placeholder {
            return Err(DefinitionError::InvalidFormat(format!(
                "name column ({}) is narrower than the placeholder '{}'",
                self.name_column(),
                self.placeholder
            )));
        }
        Ok(())
    }
}

/// Renders [`CommandNode`]s with a validated [`FormatConfig`].
#[derive(Debug, Clone)]
pub struct HelpFormatter {
    config: FormatConfig,
}

impl HelpFormatter {
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidFormat`] if `config` does not
    /// validate.
    pub fn new(config: FormatConfig) -> Result<Self, DefinitionError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Renders the full help text of `node`. `path` is the command path used
    /// in the usage line, root first.
    pub fn render(&self, node: &CommandNode, path: &[&str]) -> String {
        let mut sections = Vec::new();

        if let Some(brief) = node.brief().filter(|text| !text.trim().is_empty()) {
            sections.push(self.paragraphs(brief));
        }
        if let Some(description) = node.description().filter(|text| !text.trim().is_empty()) {
            sections.push(self.paragraphs(description));
        }
        sections.push(self.usage(node, path));

        let options: Vec<(String, String)> = node
            .registry()
            .options()
            .map(|descriptor| (option_label(descriptor), item_help(descriptor)))
            .collect();
        sections.push(self.section("Options", &options));

        let arguments: Vec<(String, String)> = node
            .registry()
            .positionals()
            .map(|descriptor| (descriptor.name.clone(), item_help(descriptor)))
            .collect();
        sections.push(self.section("Arguments", &arguments));

        let commands: Vec<(String, String)> = node
            .children()
            .iter()
            .map(|child| {
                let mut label = child.name().to_string();
                for alias in child.aliases() {
                    label.push_str(", ");
                    label.push_str(alias);
                }
                (label, child.brief().unwrap_or_default().to_string())
            })
            .collect();
        sections.push(self.section("Commands", &commands));

        if let Some(epilog) = node.epilog().filter(|text| !text.trim().is_empty()) {
            sections.push(self.paragraphs(epilog));
        }

        let separator = if self.config.compact { "\n" } else { "\n\n" };
        sections
            .into_iter()
            .filter(|section| !section.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Synthesizes the one-line usage of `node`, e.g.
    /// `Usage: fizzbuzz [options] <min> <max>`.
    pub fn usage(&self, node: &CommandNode, path: &[&str]) -> String {
        let registry = node.registry();
        let mut parts = vec!["Usage:".to_string()];
        parts.extend(path.iter().map(|segment| segment.to_string()));

        let mut optional_options = false;
        for descriptor in registry.options() {
            if descriptor.required && descriptor.default.is_none() {
                parts.push(format!("--{} {}", descriptor.long_name, descriptor.value_placeholder()));
            } else {
                optional_options = true;
            }
        }
        if optional_options {
            parts.insert(path.len() + 1, "[options]".to_string());
        }

        for descriptor in registry.positionals() {
            parts.push(match (descriptor.arity, descriptor.required) {
                (Arity::OneOrMore, true) => format!("<{}>...", descriptor.name),
                (Arity::ZeroOrMore | Arity::OneOrMore, _) => format!("[{}...]", descriptor.name),
                (_, true) => format!("<{}>", descriptor.name),
                (_, false) => format!("[{}]", descriptor.name),
            });
        }

        if node.is_group() {
            parts.push("<command> [<args>...]".to_string());
        }
        parts.join(" ")
    }

    fn paragraphs(&self, text: &str) -> String {
        let separator = if self.config.compact { "\n" } else { "\n\n" };
        text.split("\n\n")
            .map(|paragraph| wrap(paragraph, self.config.width).join("\n"))
            .filter(|paragraph| !paragraph.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn section(&self, heading: &str, items: &[(String, String)]) -> String {
        if items.is_empty() {
            return String::new();
        }
        let config = &self.config;
        let indent = " ".repeat(config.indent);
        let longest = items
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        let name_width = longest.min(config.name_column());
        let hanging = config.indent + name_width + 2;
        let help_width = config.width.saturating_sub(hanging).max(1);

        let mut lines = vec![format!("{heading}:")];
        for (label, help) in items {
            let name = truncate(label, name_width, &config.placeholder);
            let wrapped = wrap(help, help_width);
            match wrapped.split_first() {
                Some((first, rest)) => {
                    lines.push(format!("{indent}{name:<name_width$}  {first}"));
                    for line in rest {
                        lines.push(format!("{}{line}", " ".repeat(hanging)));
                    }
                }
                None => lines.push(format!("{indent}{name}")),
            }
        }
        lines.join("\n")
    }
}

/// Renders `node` as a root command with `config`.
///
/// # Errors
///
/// Returns [`DefinitionError::InvalidFormat`] if `config` does not validate.
///
/// # Examples
///
/// ```
/// use command_model_core::*;
///
/// let mut node = CommandNode::new("fizzbuzz")
///     .with_brief("Print the FizzBuzz sequence")
///     .with_argument(ArgumentDescriptor::positional("min", ValueType::Integer).with_help("Lower bound"))
///     .unwrap()
///     .with_argument(ArgumentDescriptor::positional("max", ValueType::Integer).with_help("Upper bound"))
///     .unwrap();
/// node.finalize(&HelpFlag::default()).unwrap();
///
/// let text = format_help(&node, &FormatConfig::default()).unwrap();
/// assert!(text.starts_with("Print the FizzBuzz sequence\n\nUsage: fizzbuzz [options] <min> <max>"));
/// assert!(text.contains("Arguments:\n  min  Lower bound\n  max  Upper bound"));
/// ```
pub fn format_help(node: &CommandNode, config: &FormatConfig) -> Result<String, DefinitionError> {
    let formatter = HelpFormatter::new(config.clone())?;
    Ok(formatter.render(node, &[node.name()]))
}

fn option_label(descriptor: &ArgumentDescriptor) -> String {
    let mut label = match descriptor.short_name {
        Some(short) => format!("-{short}, --{}", descriptor.long_name),
        None => format!("    --{}", descriptor.long_name),
    };
    if descriptor.takes_value() {
        label.push(' ');
        label.push_str(&descriptor.value_placeholder());
    }
    label
}

fn item_help(descriptor: &ArgumentDescriptor) -> String {
    let help = descriptor.help_text.as_deref().unwrap_or_default().trim();
    let default = match &descriptor.default {
        // A flag defaulting to false is the unremarkable case.
        Some(Value::Boolean(false)) if !descriptor.takes_value() => None,
        Some(Value::List(items)) if items.is_empty() => None,
        Some(default) => Some(format!("[default: {default}]")),
        None => None,
    };
    match default {
        Some(default) if help.is_empty() => default,
        Some(default) => format!("{help} {default}"),
        None => help.to_string(),
    }
}

/// Shortens `label` to `width` characters, ending in `placeholder`.
fn truncate(label: &str, width: usize, placeholder: &str) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    let keep = width.saturating_sub(placeholder.chars().count());
    let mut name: String = label.chars().take(keep).collect();
    name.push_str(placeholder);
    name
}

/// Greedy word wrap. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        if line_len > 0 && line_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line_len += word.len();
        line.extend(word);
    }
    if line_len > 0 {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HelpFlag;
    use crate::value::ValueType;

    fn fizzbuzz() -> CommandNode {
        let mut node = CommandNode::new("fizzbuzz")
            .with_brief("Print the FizzBuzz sequence")
            .with_description("Counts from min to max, replacing multiples of three and five.")
            .with_epilog("Exits with status 0.")
            .with_argument(ArgumentDescriptor::positional("min", ValueType::Integer).with_help("Lower bound"))
            .unwrap()
            .with_argument(ArgumentDescriptor::positional("max", ValueType::Integer).with_help("Upper bound"))
            .unwrap()
            .with_argument(
                ArgumentDescriptor::flag("skip_empty")
                    .with_short('s')
                    .with_default(false)
                    .with_help("Skip numbers that are neither fizz nor buzz"),
            )
            .unwrap();
        node.finalize(&HelpFlag::default()).unwrap();
        node
    }

    fn todo() -> CommandNode {
        let mut node = CommandNode::new("todo")
            .with_child(CommandNode::new("add").with_brief("Add an item"))
            .unwrap()
            .with_child(CommandNode::new("list").with_alias("ls").with_brief("List items"))
            .unwrap();
        node.finalize(&HelpFlag::default()).unwrap();
        node
    }

    #[test]
    fn test_render_full_layout() {
        let formatter = HelpFormatter::new(FormatConfig::default()).unwrap();
        let text = formatter.render(&fizzbuzz(), &["fizzbuzz"]);
        let expected = "\
Print the FizzBuzz sequence

Counts from min to max, replacing multiples of three and five.

Usage: fizzbuzz [options] <min> <max>

Options:
  -s, --skip-empty  Skip numbers that are neither fizz nor buzz
  -h, --help        Show this message and exit

Arguments:
  min  Lower bound
  max  Upper bound

Exits with status 0.";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_compact_drops_blank_lines() {
        let config = FormatConfig {
            compact: true,
            ..FormatConfig::default()
        };
        let formatter = HelpFormatter::new(config).unwrap();
        let text = formatter.render(&fizzbuzz(), &["fizzbuzz"]);
        assert!(!text.contains("\n\n"));
        assert!(text.starts_with("Print the FizzBuzz sequence\nCounts from"));
    }

    #[test]
    fn test_group_lists_commands_and_omits_empty_sections() {
        let formatter = HelpFormatter::new(FormatConfig::default()).unwrap();
        let text = formatter.render(&todo(), &["todo"]);
        assert!(text.starts_with("Usage: todo [options] <command> [<args>...]"));
        assert!(text.contains("Commands:\n  add       Add an item\n  list, ls  List items"));
        assert!(!text.contains("Arguments:"));
    }

    #[test]
    fn test_usage_marks_required_options_and_variadics() {
        let mut node = CommandNode::new("cp")
            .with_argument(ArgumentDescriptor::option("target", ValueType::String).required())
            .unwrap()
            .with_argument(
                ArgumentDescriptor::positional("sources", ValueType::String)
                    .with_arity(Arity::OneOrMore),
            )
            .unwrap();
        node.finalize(&HelpFlag::default()).unwrap();
        let formatter = HelpFormatter::new(FormatConfig::default()).unwrap();
        assert_eq!(
            formatter.usage(&node, &["tool", "cp"]),
            "Usage: tool cp [options] --target <target> <sources>..."
        );
    }

    #[test]
    fn test_option_labels_and_defaults() {
        let port = ArgumentDescriptor::option("port", ValueType::Integer)
            .with_default(8080_i64)
            .with_help("Port to bind");
        assert_eq!(option_label(&port), "    --port <port>");
        assert_eq!(item_help(&port), "Port to bind [default: 8080]");

        let quiet = ArgumentDescriptor::flag("quiet").with_short('q').with_default(false);
        assert_eq!(option_label(&quiet), "-q, --quiet");
        assert_eq!(item_help(&quiet), "");
    }

    #[test]
    fn test_long_names_are_truncated_with_placeholder() {
        assert_eq!(truncate("--very-long-option-name", 12, "[...]"), "--very-[...]");
        assert_eq!(truncate("short", 12, "[...]"), "short");
    }

    #[test]
    fn test_render_truncates_labels_wider_than_name_column() {
        let config = FormatConfig {
            name_column_width: Some(12),
            ..FormatConfig::default()
        };
        let text = format_help(&fizzbuzz(), &config).unwrap();
        assert!(text.contains(
            "Options:\n  -s, --s[...]  Skip numbers that are neither fizz nor buzz\n  -h, --help    Show this message and exit"
        ));
        // Labels that fit keep their own column width.
        assert!(text.contains("Arguments:\n  min  Lower bound\n  max  Upper bound"));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn test_help_wraps_with_hanging_indent() {
        let config = FormatConfig {
            width: 40,
            ..FormatConfig::default()
        };
        let mut node = CommandNode::new("app")
            .with_argument(
                ArgumentDescriptor::positional("path", ValueType::String)
                    .with_help("File to read from disk before anything else happens"),
            )
            .unwrap();
        node.finalize(&HelpFlag::default()).unwrap();
        let text = format_help(&node, &config).unwrap();
        assert!(text.contains(
            "Arguments:\n  path  File to read from disk before\n        anything else happens"
        ));
    }

    #[test]
    fn test_validate_rejects_narrow_width() {
        let config = FormatConfig {
            width: 10,
            ..FormatConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DefinitionError::InvalidFormat(_))
        ));
        assert!(HelpFormatter::new(config).is_err());
    }
}
