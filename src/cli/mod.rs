//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod browse;
pub mod cache;
pub mod category;
pub mod config;
pub mod context;
pub mod product;
pub mod status;

pub use args::{CreateArgs, ListArgs, OutputFormat, UpdateArgs};
pub use context::CommandContext;

/// Catalogop - CLI companion for a hosted product catalog
#[derive(Parser, Debug)]
#[command(name = "catalogop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "CATALOGOP_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "CATALOGOP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Catalog service base URL
    #[arg(long, global = true, env = "CATALOGOP_API_BASE", hide_env = true)]
    pub api_base: Option<String>,

    /// Artificial service delay in milliseconds, applied to every request
    #[arg(long, global = true, env = "CATALOGOP_DELAY", hide_env = true)]
    pub delay: Option<u64>,

    /// Enable debug logging
    #[arg(long, global = true, env = "CATALOGOP_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show configuration status
    Status,

    /// Display version information
    Version,

    /// List, view and edit products
    #[command(subcommand)]
    Product(ProductCommands),

    /// List product categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Interactive catalog dashboard
    Browse,

    /// Inspect the in-process query cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Product subcommands
#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products, one page at a time
    #[command(
        visible_alias = "ls",
        after_help = "EXAMPLES:\n  \
            catalogop product list                      # First page\n  \
            catalogop product list --page 3             # Third page\n  \
            catalogop product list --search phone       # Search titles and descriptions\n  \
            catalogop product list --category laptops   # Filter by category"
    )]
    List {
        #[command(flatten)]
        list: ListArgs,
    },

    /// Show one product
    Get {
        /// Product ID
        id: u64,
    },

    /// Add a product
    Create {
        #[command(flatten)]
        fields: CreateArgs,
    },

    /// Change fields of a product; only changed fields are sent
    Update {
        /// Product ID
        id: u64,

        #[command(flatten)]
        fields: UpdateArgs,
    },

    /// Delete a product
    Delete {
        /// Product ID
        id: u64,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List category slugs
    List,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache policy and entries
    Status {
        /// Load the first product page and the categories before reporting
        #[arg(long)]
        warm: bool,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}
