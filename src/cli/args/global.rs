//! Global CLI options shared across all commands
//!
//! Consolidates the global flags into one struct so handlers take a single
//! `&GlobalOptions` instead of a growing parameter list.

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// Flag > environment variable > config file > default. This struct holds
/// the flag/env layer; the config file is merged in `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (pretty, table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.catalogop/config.yaml)
    pub config: Option<String>,

    /// Catalog service base URL override
    pub api_base: Option<String>,

    /// Artificial service delay override, in milliseconds, for every request
    pub delay: Option<u64>,

    /// Debug logging
    pub debug: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_base: cli.api_base.clone(),
            delay: cli.delay,
            debug: cli.debug,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Get API base override as `Option<&str>`.
    pub fn api_base_ref(&self) -> Option<&str> {
        self.api_base.as_deref()
    }
}
