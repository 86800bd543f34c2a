//! Documentation dialects for command models.
//!
//! A [`DocDialect`] turns free-form documentation text into a structured
//! [`CommandDoc`]: brief line, description, per-parameter help and epilog.
//! [`CommandDoc::apply`] then copies those fields into a not-yet-finalized
//! [`CommandNode`](command_model_core::CommandNode), leaving anything the
//! model already set untouched.
//!
//! Two dialects ship with the crate:
//!
//! - [`NumpyDialect`]: numpydoc-style sections (`Parameters`,
//!   `Other Parameters`, `Notes`).
//! - [`PlainDialect`]: first paragraph is the brief, the rest is the
//!   description.
//!
//! # Example
//!
//! ```
//! use command_model_core::{ArgumentDescriptor, CommandNode, ValueType};
//! use command_model_docstring::{DocDialect, NumpyDialect};
//!
//! let doc = NumpyDialect.parse(
//!     "Print the FizzBuzz sequence.
//!
//!     Parameters
//!     ----------
//!     min : int
//!         Lower bound.
//!     max : int
//!         Upper bound.
//!     ",
//! );
//!
//! let mut node = CommandNode::new("fizzbuzz")
//!     .with_argument(ArgumentDescriptor::positional("min", ValueType::Integer))
//!     .unwrap()
//!     .with_argument(ArgumentDescriptor::positional("max", ValueType::Integer))
//!     .unwrap();
//! doc.apply(&mut node);
//!
//! assert_eq!(node.brief(), Some("Print the FizzBuzz sequence."));
//! assert_eq!(
//!     node.registry().get("max").unwrap().help_text.as_deref(),
//!     Some("Upper bound.")
//! );
//! ```

mod doc;
mod numpy;
mod plain;
mod text;

pub use doc::CommandDoc;
pub use numpy::NumpyDialect;
pub use plain::PlainDialect;

/// A documentation format that can be parsed into a [`CommandDoc`].
///
/// Parsing never fails: text the dialect does not understand is dropped.
pub trait DocDialect: Send + Sync {
    /// Short identifier, e.g. `"numpy"`.
    fn name(&self) -> &'static str;

    fn parse(&self, text: &str) -> CommandDoc;
}

/// Looks up a bundled dialect by [`DocDialect::name`].
///
/// # Examples
///
/// ```
/// use command_model_docstring::dialect;
///
/// assert_eq!(dialect("plain").unwrap().name(), "plain");
/// assert!(dialect("google").is_none());
/// ```
pub fn dialect(name: &str) -> Option<Box<dyn DocDialect>> {
    match name {
        "numpy" => Some(Box::new(NumpyDialect)),
        "plain" => Some(Box::new(PlainDialect)),
        _ => None,
    }
}
