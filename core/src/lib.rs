//! Command model and argument matching engine.
//!
//! This crate defines the declarative model of a command-line program and
//! everything needed to run it:
//!
//! - [`ArgumentDescriptor`]: one positional or option, with its
//!   [`ValueType`], [`Arity`], default and flag names.
//! - [`ArgumentRegistry`]: the validated arguments of one command, locked by
//!   [`finalize`](ArgumentRegistry::finalize).
//! - [`CommandNode`]: a named, aliasable command owning its registry and
//!   its sub-commands.
//! - [`tokenize`] and [`bind`]: lexing an argument vector and matching it
//!   against a registry into [`BoundArguments`].
//! - [`CommandTree`]: sub-command resolution, handler invocation and
//!   error reporting.
//! - [`HelpFormatter`]: rendering a node into help text per
//!   [`FormatConfig`].
//!
//! Registration problems surface as [`DefinitionError`] before anything
//! runs; parse problems surface as [`MatchError`], tagged with the command
//! path in a [`DispatchError`].
//!
//! # Example
//!
//! ```
//! use command_model_core::*;
//!
//! let fizzbuzz = CommandNode::new("fizzbuzz")
//!     .with_brief("Print the FizzBuzz sequence")
//!     .with_argument(ArgumentDescriptor::positional("min", ValueType::Integer))
//!     .unwrap()
//!     .with_argument(ArgumentDescriptor::positional("max", ValueType::Integer))
//!     .unwrap()
//!     .with_argument(ArgumentDescriptor::flag("skip_empty").with_short('s').with_default(false))
//!     .unwrap()
//!     .with_handler(|args| {
//!         let min = args.get_integer("min").unwrap_or(1);
//!         let max = args.get_integer("max").unwrap_or(min);
//!         i32::from(max < min)
//!     });
//!
//! let tree = CommandTree::new(fizzbuzz).unwrap();
//!
//! let Dispatch::Invoke { arguments, .. } = tree.resolve(["1", "15", "-s"]).unwrap() else {
//!     panic!("expected a match");
//! };
//! assert_eq!(arguments.get_integer("max"), Some(15));
//! assert!(arguments.flag("skip_empty"));
//!
//! let err = tree.resolve(["1"]).unwrap_err();
//! assert_eq!(err.error, MatchError::MissingRequiredArgument("max".into()));
//!
//! let mut out = Vec::<u8>::new();
//! let mut err = Vec::<u8>::new();
//! assert_eq!(tree.run(["--help"], &mut out, &mut err), 0);
//! assert!(String::from_utf8(out).unwrap().contains("Usage: fizzbuzz [options] <min> <max>"));
//! ```

mod command;
mod config;
mod descriptor;
mod dispatch;
mod error;
mod help;
mod matcher;
mod registry;
mod tokenizer;
mod value;

pub use command::{CommandNode, Handler};
pub use config::{HelpFlag, TreeConfig};
pub use descriptor::{ArgumentDescriptor, ArgumentKind, Arity, kebab_case};
pub use dispatch::{CommandTree, Dispatch};
pub use error::{Conflict, DefinitionError, DispatchError, MatchError, OptionFlag};
pub use help::{FormatConfig, HelpFormatter, format_help};
pub use matcher::{Binding, BoundArguments, bind};
pub use registry::ArgumentRegistry;
pub use tokenizer::{Token, Tokenizer, tokenize};
pub use value::{Value, ValueType};
