//! Application configuration file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use command_model_core::TreeConfig;
use command_model_docstring::DocDialect;

use crate::error::{LoadError, Result};
use crate::format;

/// Tree configuration plus loader settings, read from one JSON or YAML file.
///
/// Tree settings sit at the top level:
///
/// ```yaml
/// error_status: 64
/// doc_dialect: plain
/// help_flag:
///   short: "?"
/// format:
///   width: 100
///   compact: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub tree: TreeConfig,
    /// Dialect used for `doc` fields in model files.
    pub doc_dialect: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tree: TreeConfig::default(),
            doc_dialect: "numpy".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads a configuration file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`], [`LoadError::Io`], or a
    /// parse error for the detected format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = format::read(path)?;
        debug!(path = %path.display(), dialect = %config.doc_dialect, "loaded config");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        format::write(path.as_ref(), self)
    }

    /// Returns the configured documentation dialect.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnknownDialect`] if no bundled dialect has that name.
    pub fn dialect(&self) -> Result<Box<dyn DocDialect>> {
        command_model_docstring::dialect(&self.doc_dialect)
            .ok_or_else(|| LoadError::UnknownDialect(self.doc_dialect.clone()))
    }
}
