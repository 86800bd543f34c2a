//! Loading command models and configuration from JSON or YAML files.
//!
//! A model file is a serialized [`ModelSpec`]: a root command with its
//! arguments and nested sub-commands. [`ModelSpec::build`] turns it into a
//! [`CommandNode`](command_model_core::CommandNode), applying any `doc`
//! fields through a documentation dialect. An optional [`AppConfig`] file
//! selects that dialect and carries the tree-wide
//! [`TreeConfig`](command_model_core::TreeConfig).
//!
//! Handlers cannot be serialized; attach them to the built tree with
//! [`CommandNode::child_mut`](command_model_core::CommandNode::child_mut)
//! and [`set_handler`](command_model_core::CommandNode::set_handler) before
//! finalizing.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use command_model_loader::load_tree;
//!
//! let tree = load_tree("todo.yaml", Some(Path::new("todo.config.yaml")))?;
//! let help = tree.render_help(&["add"]).unwrap_or_default();
//! println!("{help}");
//! # Ok::<(), command_model_loader::LoadError>(())
//! ```

mod config;
mod error;
mod format;
mod model;

use std::path::Path;

use command_model_core::CommandTree;
use tracing::debug;

pub use config::AppConfig;
pub use error::{LoadError, Result};
pub use format::FileFormat;
pub use model::{ArgumentSpec, CommandSpec, ModelSpec, TypeName};

/// Loads a model file and an optional configuration file into a finalized
/// [`CommandTree`].
///
/// # Errors
///
/// Returns any [`LoadError`] from reading either file, building the model,
/// or finalizing the tree.
pub fn load_tree(model: impl AsRef<Path>, config: Option<&Path>) -> Result<CommandTree> {
    let config = match config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let spec = ModelSpec::load(model)?;
    let root = spec.build_with(config.dialect()?.as_ref())?;
    let tree = CommandTree::with_config(root, config.tree)?;
    debug!(command = %tree.root().name(), "loaded command tree");
    Ok(tree)
}
