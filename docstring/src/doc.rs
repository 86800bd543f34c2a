use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use command_model_core::CommandNode;

/// Structured documentation of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDoc {
    pub brief: Option<String>,
    pub description: Option<String>,
    /// Parameter name to help text.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    pub epilog: Option<String>,
}

impl CommandDoc {
    pub fn is_empty(&self) -> bool {
        self.brief.is_none()
            && self.description.is_none()
            && self.parameters.is_empty()
            && self.epilog.is_none()
    }

    /// Copies the documentation into `node`.
    ///
    /// Only fills what is still empty: an explicit brief, description,
    /// epilog or argument help set by the model wins. Parameter names are
    /// matched against descriptor names. Has no effect on argument help once
    /// the node is finalized.
    ///
    /// Returns the names of documented parameters that matched no argument.
    pub fn apply(&self, node: &mut CommandNode) -> Vec<String> {
        if node.brief().is_none() {
            if let Some(brief) = &self.brief {
                node.set_brief(brief);
            }
        }
        if node.description().is_none() {
            if let Some(description) = &self.description {
                node.set_description(description);
            }
        }
        if node.epilog().is_none() {
            if let Some(epilog) = &self.epilog {
                node.set_epilog(epilog);
            }
        }

        let mut unmatched = Vec::new();
        let registry = node.registry_mut();
        for (name, help) in &self.parameters {
            match registry.get(name).map(|descriptor| descriptor.help_text.is_none()) {
                Some(true) => {
                    registry.set_help_text(name, help);
                }
                Some(false) => {}
                None => unmatched.push(name.clone()),
            }
        }
        if !unmatched.is_empty() {
            debug!(command = node.name(), unmatched = ?unmatched, "documented parameters without arguments");
        }
        unmatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_model_core::{ArgumentDescriptor, HelpFlag, ValueType};

    fn doc() -> CommandDoc {
        CommandDoc {
            brief: Some("Copy files".into()),
            description: Some("Copies sources into a target directory.".into()),
            parameters: BTreeMap::from([
                ("sources".to_string(), "Files to copy".to_string()),
                ("force".to_string(), "Overwrite existing files".to_string()),
                ("stale".to_string(), "No longer exists".to_string()),
            ]),
            epilog: None,
        }
    }

    fn node() -> CommandNode {
        CommandNode::new("cp")
            .with_brief("Explicit brief")
            .with_argument(ArgumentDescriptor::positional("sources", ValueType::String))
            .unwrap()
            .with_argument(ArgumentDescriptor::flag("force").with_help("Keep me"))
            .unwrap()
    }

    #[test]
    fn test_apply_fills_only_missing_fields() {
        let mut node = node();
        let unmatched = doc().apply(&mut node);

        assert_eq!(node.brief(), Some("Explicit brief"));
        assert_eq!(node.description(), Some("Copies sources into a target directory."));
        assert_eq!(node.epilog(), None);
        let registry = node.registry();
        assert_eq!(registry.get("sources").unwrap().help_text.as_deref(), Some("Files to copy"));
        assert_eq!(registry.get("force").unwrap().help_text.as_deref(), Some("Keep me"));
        assert_eq!(unmatched, vec!["stale".to_string()]);
    }

    #[test]
    fn test_apply_after_finalize_leaves_arguments_alone() {
        let mut node = node();
        node.finalize(&HelpFlag::default()).unwrap();
        doc().apply(&mut node);
        assert_eq!(node.registry().get("sources").unwrap().help_text, None);
    }

    #[test]
    fn test_is_empty() {
        assert!(CommandDoc::default().is_empty());
        assert!(!doc().is_empty());
    }
}
