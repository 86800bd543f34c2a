//! Tree-wide configuration: the reserved help flag, help formatting and the
//! exit status used for parse errors.
//!
//! All types deserialize with per-field defaults, so a configuration file
//! only has to name what it changes:
//!
//! ```
//! use command_model_core::TreeConfig;
//!
//! let config: TreeConfig = serde_json::from_str(r#"{ "format": { "width": 100 } }"#).unwrap();
//! assert_eq!(config.format.width, 100);
//! assert_eq!(config.help_flag.long, "help");
//! assert_eq!(config.error_status, 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::help::FormatConfig;

/// The reserved help option injected into every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpFlag {
    /// Long flag name without `--`.
    pub long: String,
    /// Short alias, only claimed on commands where it is still free.
    pub short: Option<char>,
    /// Help text shown in the Options section.
    pub help: String,
}

impl Default for HelpFlag {
    fn default() -> Self {
        Self {
            long: "help".to_string(),
            short: Some('h'),
            help: "Show this message and exit".to_string(),
        }
    }
}

/// Configuration applied to a whole [`CommandTree`](crate::CommandTree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub help_flag: HelpFlag,
    pub format: FormatConfig,
    /// Exit status returned by [`CommandTree::run`](crate::CommandTree::run)
    /// when the arguments do not match.
    pub error_status: i32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            help_flag: HelpFlag::default(),
            format: FormatConfig::default(),
            error_status: 2,
        }
    }
}
