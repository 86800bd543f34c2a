//! Command tree nodes.
//!
//! A [`CommandNode`] owns its [`ArgumentRegistry`] and its children outright;
//! navigation is parent-to-child only. Sibling names and aliases share one
//! namespace, checked when a child is attached.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::HelpFlag;
use crate::descriptor::ArgumentDescriptor;
use crate::error::{Conflict, DefinitionError};
use crate::matcher::BoundArguments;
use crate::registry::ArgumentRegistry;

/// Callback invoked with the bound arguments of a matched command. The
/// returned value is the process exit status.
pub type Handler = Arc<dyn Fn(&BoundArguments) -> i32 + Send + Sync>;

/// A named command: a leaf with a handler, or a group routing to children.
///
/// # Examples
///
/// ```
/// use command_model_core::*;
///
/// let list = CommandNode::new("list")
///     .with_alias("ls")
///     .with_brief("List items")
///     .with_argument(ArgumentDescriptor::flag("all"))
///     .unwrap();
///
/// let root = CommandNode::new("todo")
///     .with_child(CommandNode::new("add"))
///     .unwrap()
///     .with_child(list)
///     .unwrap();
///
/// assert!(root.is_group());
/// assert_eq!(root.child("ls").unwrap().name(), "list");
/// assert!(root.with_child(CommandNode::new("ls")).is_err());
/// ```
#[derive(Clone, Default)]
pub struct CommandNode {
    name: String,
    aliases: Vec<String>,
    brief: Option<String>,
    description: Option<String>,
    epilog: Option<String>,
    registry: ArgumentRegistry,
    children: Vec<CommandNode>,
    /// Child name or alias to index in `children`.
    lookup: HashMap<String, usize>,
    handler: Option<Handler>,
}

impl CommandNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_brief(mut self, brief: &str) -> Self {
        self.brief = Some(brief.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_epilog(mut self, epilog: &str) -> Self {
        self.epilog = Some(epilog.to_string());
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&BoundArguments) -> i32 + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Registers an argument, consuming and returning the node.
    ///
    /// # Errors
    ///
    /// Propagates the [`DefinitionError`] from
    /// [`ArgumentRegistry::register`].
    pub fn with_argument(mut self, descriptor: ArgumentDescriptor) -> Result<Self, DefinitionError> {
        self.add_argument(descriptor)?;
        Ok(self)
    }

    /// Attaches a child command, consuming and returning the node.
    ///
    /// # Errors
    ///
    /// See [`CommandNode::add_child`].
    pub fn with_child(mut self, child: CommandNode) -> Result<Self, DefinitionError> {
        self.add_child(child)?;
        Ok(self)
    }

    pub fn add_argument(&mut self, descriptor: ArgumentDescriptor) -> Result<(), DefinitionError> {
        self.registry.register(descriptor)
    }

    /// Attaches a child command.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateDefinition`] when the child's name
    /// or one of its aliases is already used by a sibling (or repeated within
    /// the child itself), or when this node is finalized.
    /// Returns [`DefinitionError::InvalidDefinition`] for an empty name.
    pub fn add_child(&mut self, child: CommandNode) -> Result<(), DefinitionError> {
        if self.registry.is_finalized() {
            return Err(DefinitionError::duplicate(&child.name, Conflict::Finalized));
        }
        if child.name.trim().is_empty() {
            return Err(DefinitionError::invalid(&self.name, "command name cannot be empty"));
        }
        if self.lookup.contains_key(&child.name) {
            return Err(DefinitionError::duplicate(&child.name, Conflict::CommandName));
        }

        let mut seen = vec![child.name.as_str()];
        for alias in &child.aliases {
            if alias.trim().is_empty() {
                return Err(DefinitionError::invalid(&child.name, "alias cannot be empty"));
            }
            if self.lookup.contains_key(alias) || seen.contains(&alias.as_str()) {
                return Err(DefinitionError::duplicate(alias, Conflict::Alias));
            }
            seen.push(alias);
        }

        let index = self.children.len();
        for key in seen {
            self.lookup.insert(key.to_string(), index);
        }
        self.children.push(child);
        Ok(())
    }

    pub fn set_brief(&mut self, brief: &str) {
        self.brief = Some(brief.to_string());
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
    }

    pub fn set_epilog(&mut self, epilog: &str) {
        self.epilog = Some(epilog.to_string());
    }

    pub fn set_handler<F>(&mut self, handler: F)
    where
        F: Fn(&BoundArguments) -> i32 + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn brief(&self) -> Option<&str> {
        self.brief.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn epilog(&self) -> Option<&str> {
        self.epilog.as_deref()
    }

    pub fn registry(&self) -> &ArgumentRegistry {
        &self.registry
    }

    /// Mutable access for attaching documentation before finalization. The
    /// registry itself refuses structural changes once finalized.
    pub fn registry_mut(&mut self) -> &mut ArgumentRegistry {
        &mut self.registry
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Looks up a direct child by name or alias.
    pub fn child(&self, token: &str) -> Option<&CommandNode> {
        self.lookup.get(token).map(|&index| &self.children[index])
    }

    pub fn child_mut(&mut self, token: &str) -> Option<&mut CommandNode> {
        let index = *self.lookup.get(token)?;
        self.children.get_mut(index)
    }

    /// Children in registration order.
    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Follows `path` (names or aliases, not including this node) down the
    /// tree.
    pub fn find(&self, path: &[&str]) -> Option<&CommandNode> {
        path.iter().try_fold(self, |node, segment| node.child(segment))
    }

    pub fn is_finalized(&self) -> bool {
        self.registry.is_finalized()
    }

    /// Injects the help flag into every registry of the subtree and locks
    /// them. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] raised by a registry.
    pub fn finalize(&mut self, help_flag: &HelpFlag) -> Result<(), DefinitionError> {
        self.registry.inject_help(help_flag);
        self.registry.finalize()?;
        for child in &mut self.children {
            child.finalize(help_flag)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("brief", &self.brief)
            .field("registry", &self.registry)
            .field("children", &self.children)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}
