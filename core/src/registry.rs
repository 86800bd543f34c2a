//! Argument descriptor registry for a single command.
//!
//! Registration validates every structural invariant up front: unique names,
//! unique long and short flags, at most one variadic positional and only in
//! last position. Once [`finalize`](ArgumentRegistry::finalize)d, the registry
//! is read-only and every lookup (by name, long flag or short flag) is O(1).
//!
//! # Examples
//!
//! ```
//! use command_model_core::*;
//!
//! let mut registry = ArgumentRegistry::new();
//! registry.register(ArgumentDescriptor::positional("min", ValueType::Integer)).unwrap();
//! registry.register(ArgumentDescriptor::flag("skip_empty").with_short('s')).unwrap();
//!
//! // Short flags are never shared.
//! let err = registry
//!     .register(ArgumentDescriptor::flag("silent").with_short('s'))
//!     .unwrap_err();
//! assert!(matches!(err, DefinitionError::DuplicateDefinition { .. }));
//!
//! registry.finalize().unwrap();
//! assert!(registry.find_short('s').is_some());
//! assert!(registry.find_long("skip-empty").is_some());
//! ```

use std::collections::HashMap;

use crate::config::HelpFlag;
use crate::descriptor::{ArgumentDescriptor, kebab_case};
use crate::error::{Conflict, DefinitionError};
use crate::value::Value;

/// Ordered positionals plus the set of options for one command.
#[derive(Debug, Clone, Default)]
pub struct ArgumentRegistry {
    descriptors: Vec<ArgumentDescriptor>,
    by_name: HashMap<String, usize>,
    by_long: HashMap<String, usize>,
    by_short: HashMap<char, usize>,
    /// Positional binding order; indices into `descriptors`.
    positionals: Vec<usize>,
    options: Vec<usize>,
    help: Option<usize>,
    finalized: bool,
}

impl ArgumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateDefinition`] if the name, long
    /// flag or short flag is taken, if a second variadic positional is
    /// added, or if the registry is already finalized. Returns
    /// [`DefinitionError::InvalidDefinition`] for descriptors that are
    /// malformed on their own or cannot be ordered after the existing
    /// positionals.
    pub fn register(&mut self, descriptor: ArgumentDescriptor) -> Result<(), DefinitionError> {
        let name = descriptor.name.as_str();
        if self.finalized {
            return Err(DefinitionError::duplicate(name, Conflict::Finalized));
        }
        if name.trim().is_empty() {
            return Err(DefinitionError::invalid(name, "name cannot be empty"));
        }
        if self.by_name.contains_key(name) {
            return Err(DefinitionError::duplicate(name, Conflict::Name));
        }
        if let Some(default) = &descriptor.default {
            if !default_fits(&descriptor, default) {
                return Err(DefinitionError::invalid(
                    name,
                    format!("default '{default}' is not a valid {}", descriptor.value_type),
                ));
            }
        }

        if descriptor.is_positional() {
            self.check_positional(&descriptor)?;
        } else {
            self.check_option(&descriptor)?;
        }

        self.insert(descriptor);
        Ok(())
    }

    fn check_positional(&self, descriptor: &ArgumentDescriptor) -> Result<(), DefinitionError> {
        let name = descriptor.name.as_str();
        if descriptor.short_name.is_some() {
            return Err(DefinitionError::invalid(name, "positionals cannot have a short flag"));
        }
        let Some(last) = self.positionals().last() else {
            return Ok(());
        };
        if last.arity.is_variadic() {
            if descriptor.arity.is_variadic() {
                return Err(DefinitionError::duplicate(name, Conflict::Variadic));
            }
            return Err(DefinitionError::invalid(
                name,
                format!("positional cannot follow variadic positional '{}'", last.name),
            ));
        }
        if descriptor.required && !last.required {
            return Err(DefinitionError::invalid(
                name,
                format!("required positional cannot follow optional positional '{}'", last.name),
            ));
        }
        Ok(())
    }

    fn check_option(&self, descriptor: &ArgumentDescriptor) -> Result<(), DefinitionError> {
        let name = descriptor.name.as_str();
        let long = descriptor.long_name.as_str();
        if long.is_empty() || long.starts_with('-') || long.contains('=') {
            return Err(DefinitionError::invalid(
                name,
                format!("invalid long flag '{long}'"),
            ));
        }
        if self.by_long.contains_key(long) {
            return Err(DefinitionError::duplicate(long, Conflict::LongName));
        }
        if let Some(short) = descriptor.short_name {
            if !short.is_ascii_alphabetic() {
                return Err(DefinitionError::invalid(
                    name,
                    format!("short flag '{short}' must be an ASCII letter"),
                ));
            }
            if self.by_short.contains_key(&short) {
                return Err(DefinitionError::duplicate(&short.to_string(), Conflict::ShortName));
            }
        }
        Ok(())
    }

    fn insert(&mut self, descriptor: ArgumentDescriptor) {
        let index = self.descriptors.len();
        self.by_name.insert(descriptor.name.clone(), index);
        if descriptor.is_positional() {
            self.positionals.push(index);
        } else {
            self.by_long.insert(descriptor.long_name.clone(), index);
            if let Some(short) = descriptor.short_name {
                self.by_short.insert(short, index);
            }
            self.options.push(index);
        }
        self.descriptors.push(descriptor);
    }

    /// Adds the reserved help flag unless the model already claims its long
    /// flag. The short form is only claimed when still free. If an argument
    /// is already *named* like the flag, the help descriptor gets an
    /// internal name so both can coexist.
    pub(crate) fn inject_help(&mut self, flag: &HelpFlag) {
        if self.finalized || self.by_long.contains_key(&flag.long) {
            return;
        }
        let mut name = flag.long.clone();
        while self.by_name.contains_key(&name) {
            name.insert_str(0, "__");
        }
        let mut descriptor = ArgumentDescriptor::flag(&name)
            .with_rename(&flag.long)
            .with_help(&flag.help);
        descriptor.short_name = flag.short.filter(|short| !self.by_short.contains_key(short));
        self.help = Some(self.descriptors.len());
        self.insert(descriptor);
    }

    /// Locks the registry. Idempotent: finalizing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidDefinition`] if a `requires` or
    /// `conflicts_with` relationship names an option that does not exist.
    pub fn finalize(&mut self) -> Result<(), DefinitionError> {
        if self.finalized {
            return Ok(());
        }
        for option in self.options() {
            for other in option.requires.iter().chain(&option.conflicts_with) {
                let known = self
                    .get(other)
                    .is_some_and(|descriptor| descriptor.is_option());
                if !known || other == &option.name {
                    return Err(DefinitionError::invalid(
                        &option.name,
                        format!("relationship names unknown option '{other}'"),
                    ));
                }
            }
        }
        self.finalized = true;
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Looks up a descriptor by its `name`.
    pub fn get(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.by_name.get(name).map(|&index| &self.descriptors[index])
    }

    /// Looks up an option by long flag (without `--`). The snake_case
    /// spelling of a kebab-case flag is accepted too.
    pub fn find_long(&self, long: &str) -> Option<&ArgumentDescriptor> {
        self.by_long
            .get(long)
            .or_else(|| self.by_long.get(&kebab_case(long)))
            .map(|&index| &self.descriptors[index])
    }

    pub fn find_short(&self, short: char) -> Option<&ArgumentDescriptor> {
        self.by_short.get(&short).map(|&index| &self.descriptors[index])
    }

    /// Returns the positional bound at `slot` in registration order.
    pub fn positional(&self, slot: usize) -> Option<&ArgumentDescriptor> {
        self.positionals.get(slot).map(|&index| &self.descriptors[index])
    }

    /// Positionals in binding order.
    pub fn positionals(&self) -> impl Iterator<Item = &ArgumentDescriptor> {
        self.positionals.iter().map(|&index| &self.descriptors[index])
    }

    /// Options in registration order, including the injected help flag.
    pub fn options(&self) -> impl Iterator<Item = &ArgumentDescriptor> {
        self.options.iter().map(|&index| &self.descriptors[index])
    }

    /// All descriptors in registration order.
    pub fn descriptors(&self) -> &[ArgumentDescriptor] {
        &self.descriptors
    }

    /// Returns `true` if `descriptor` is the injected help flag.
    pub fn is_help(&self, descriptor: &ArgumentDescriptor) -> bool {
        self.help
            .is_some_and(|index| std::ptr::eq(&self.descriptors[index], descriptor))
    }

    /// Sets the help text of a registered descriptor. Only possible before
    /// finalization; returns `false` otherwise or if `name` is unknown.
    pub fn set_help_text(&mut self, name: &str, help: &str) -> bool {
        if self.finalized {
            return false;
        }
        match self.by_name.get(name) {
            Some(&index) => {
                self.descriptors[index].help_text = Some(help.to_string());
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn default_fits(descriptor: &ArgumentDescriptor, default: &Value) -> bool {
    if descriptor.arity.is_variadic() {
        return default
            .as_list()
            .is_some_and(|items| items.iter().all(|item| descriptor.value_type.accepts(item)));
    }
    descriptor.value_type.accepts(default)
}
