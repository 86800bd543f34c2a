//! Sub-command resolution and handler invocation.
//!
//! [`CommandTree`] owns a finalized root [`CommandNode`]. Resolution walks the
//! tree following positional tokens that name a child (or one of its
//! aliases), then binds the remaining tokens against the node where the walk
//! stopped. The tree is immutable after construction and may be shared
//! across threads.

use std::io::{self, Write};
use std::iter::Peekable;

use tracing::debug;

use crate::command::CommandNode;
use crate::config::TreeConfig;
use crate::error::{DefinitionError, DispatchError, MatchError};
use crate::help::HelpFormatter;
use crate::matcher::{Binding, BoundArguments, bind};
use crate::tokenizer::{Token, tokenize};

/// Outcome of a successful resolution.
#[derive(Debug)]
pub enum Dispatch<'t> {
    /// A command matched and its arguments were bound.
    Invoke {
        path: Vec<String>,
        node: &'t CommandNode,
        arguments: BoundArguments,
    },
    /// Help was requested for `node`, explicitly or by naming a group
    /// without a sub-command.
    Help {
        path: Vec<String>,
        node: &'t CommandNode,
    },
}

impl<'t> Dispatch<'t> {
    /// Canonical command path, root first.
    pub fn path(&self) -> &[String] {
        match self {
            Dispatch::Invoke { path, .. } | Dispatch::Help { path, .. } => path,
        }
    }

    pub fn node(&self) -> &'t CommandNode {
        match self {
            Dispatch::Invoke { node, .. } | Dispatch::Help { node, .. } => *node,
        }
    }
}

/// A finalized command tree plus its formatting configuration.
///
/// # Examples
///
/// ```
/// use command_model_core::*;
///
/// let root = CommandNode::new("todo")
///     .with_child(CommandNode::new("add"))
///     .unwrap()
///     .with_child(
///         CommandNode::new("list")
///             .with_alias("ls")
///             .with_argument(ArgumentDescriptor::flag("all"))
///             .unwrap(),
///     )
///     .unwrap();
/// let tree = CommandTree::new(root).unwrap();
///
/// match tree.resolve(["ls", "--all"]).unwrap() {
///     Dispatch::Invoke { path, arguments, .. } => {
///         assert_eq!(path, vec!["todo", "list"]);
///         assert!(arguments.flag("all"));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CommandTree {
    root: CommandNode,
    config: TreeConfig,
    formatter: HelpFormatter,
}

impl CommandTree {
    /// Finalizes `root` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] found in the tree.
    pub fn new(root: CommandNode) -> Result<Self, DefinitionError> {
        Self::with_config(root, TreeConfig::default())
    }

    /// Validates `config` and finalizes every registry of `root`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidFormat`] for a bad help format, or
    /// the first registration error found in the tree.
    pub fn with_config(mut root: CommandNode, config: TreeConfig) -> Result<Self, DefinitionError> {
        let formatter = HelpFormatter::new(config.format.clone())?;
        root.finalize(&config.help_flag)?;
        Ok(Self {
            root,
            config,
            formatter,
        })
    }

    pub fn root(&self) -> &CommandNode {
        &self.root
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Finds the node at `path` (below the root, names or aliases).
    pub fn find(&self, path: &[&str]) -> Option<&CommandNode> {
        self.root.find(path)
    }

    /// Resolves `args` (without the program name) to a command.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] carrying the path of the node where
    /// matching failed. Nothing is bound on error.
    pub fn resolve<I>(&self, args: I) -> Result<Dispatch<'_>, DispatchError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut tokens = tokenize(args).peekable();
        let mut node = &self.root;
        let mut path = vec![self.root.name()];

        while node.is_group() {
            let routed = node.handler().is_none();
            match tokens.peek() {
                Some(Token::Positional(text)) => match node.child(text) {
                    Some(child) => {
                        debug!(command = child.name(), token = %text, "descending");
                        tokens.next();
                        path.push(child.name());
                        node = child;
                    }
                    None if routed => {
                        let error = MatchError::UnknownCommand(text.clone());
                        return Err(DispatchError::new(&path, error));
                    }
                    None => break,
                },
                Some(Token::Separator) if routed => {
                    return separated(node, &path, &mut tokens);
                }
                None if routed => return Ok(help(node, &path)),
                _ => break,
            }
        }

        debug!(path = ?path, "resolved command");
        match bind(node.registry(), tokens) {
            Ok(Binding::HelpRequested) => Ok(help(node, &path)),
            // A routing group given only options still needs a sub-command.
            Ok(Binding::Arguments(_)) if node.is_group() && node.handler().is_none() => {
                Ok(help(node, &path))
            }
            Ok(Binding::Arguments(arguments)) => Ok(Dispatch::Invoke {
                path: owned(&path),
                node,
                arguments,
            }),
            Err(error) => Err(DispatchError::new(&path, error)),
        }
    }

    /// Renders the help text of the node at `path` (below the root).
    pub fn render_help(&self, path: &[&str]) -> Option<String> {
        let node = self.find(path)?;
        let full = self.canonical_path(path);
        let full: Vec<&str> = full.iter().map(String::as_str).collect();
        Some(self.formatter.render(node, &full))
    }

    /// Renders the one-line usage of the node at `path` (below the root).
    pub fn render_usage(&self, path: &[&str]) -> Option<String> {
        let node = self.find(path)?;
        let full = self.canonical_path(path);
        let full: Vec<&str> = full.iter().map(String::as_str).collect();
        Some(self.formatter.usage(node, &full))
    }

    /// Resolves `args`, invokes the handler and reports help or errors.
    ///
    /// Help goes to `stdout` and yields 0. A parse error prints
    /// `error: <message>` and the usage line of the failing node to `stderr`
    /// and yields [`TreeConfig::error_status`]. Otherwise the handler's
    /// status is returned.
    pub fn run<I>(&self, args: I, stdout: &mut dyn Write, stderr: &mut dyn Write) -> i32
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.report(args, stdout, stderr).unwrap_or(1)
    }

    /// [`run`](Self::run) over the process arguments and standard streams.
    pub fn run_from_env(&self) -> i32 {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.run(std::env::args().skip(1), &mut stdout.lock(), &mut stderr.lock())
    }

    fn report<I>(&self, args: I, stdout: &mut dyn Write, stderr: &mut dyn Write) -> io::Result<i32>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        match self.resolve(args) {
            Ok(Dispatch::Help { path, node }) => {
                let path: Vec<&str> = path.iter().map(String::as_str).collect();
                writeln!(stdout, "{}", self.formatter.render(node, &path))?;
                Ok(0)
            }
            Ok(Dispatch::Invoke {
                path,
                node,
                arguments,
            }) => match node.handler() {
                Some(handler) => Ok(handler(&arguments)),
                None => {
                    writeln!(stderr, "error: no handler registered for '{}'", path.join(" "))?;
                    Ok(1)
                }
            },
            Err(err) => {
                writeln!(stderr, "error: {err}")?;
                let segments: Vec<&str> = err.path.iter().skip(1).map(String::as_str).collect();
                if let Some(usage) = self.render_usage(&segments) {
                    writeln!(stderr, "{usage}")?;
                }
                Ok(self.config.error_status)
            }
        }
    }

    fn canonical_path(&self, path: &[&str]) -> Vec<String> {
        let mut node = &self.root;
        let mut full = vec![node.name().to_string()];
        for segment in path {
            if let Some(child) = node.child(segment) {
                full.push(child.name().to_string());
                node = child;
            }
        }
        full
    }
}

fn help<'t>(node: &'t CommandNode, path: &[&str]) -> Dispatch<'t> {
    Dispatch::Help {
        path: owned(path),
        node,
    }
}

/// `--` at a routing group: the next token can only be a sub-command name,
/// and `--` forbids treating it as one.
fn separated<'t, I>(
    node: &'t CommandNode,
    path: &[&str],
    tokens: &mut Peekable<I>,
) -> Result<Dispatch<'t>, DispatchError>
where
    I: Iterator<Item = Token>,
{
    tokens.next();
    match tokens.next() {
        Some(Token::Positional(text)) => {
            Err(DispatchError::new(path, MatchError::UnknownCommand(text)))
        }
        _ => Ok(help(node, path)),
    }
}

fn owned(path: &[&str]) -> Vec<String> {
    path.iter().map(|segment| segment.to_string()).collect()
}
