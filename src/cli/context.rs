//! Command execution context
//!
//! Loads configuration once, builds the catalog client, and wires the
//! query cache between the read and write sides.

use std::sync::Arc;

use log::debug;

use crate::cache::{CachePolicy, CatalogMutations, CatalogQueries, QueryCache};
use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::{CatalogApi, CatalogClient, ListParams};
use crate::config::Config;
use crate::error::Result;

/// Context for command execution containing config, cache, queries and
/// runtime options.
pub struct CommandContext {
    /// Loaded configuration with flag/env overrides applied
    pub config: Config,
    /// Query cache shared by `queries` and `mutations`
    pub cache: QueryCache,
    /// Cached reads
    pub queries: CatalogQueries,
    /// Writes with cache invalidation
    pub mutations: CatalogMutations,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context from global options.
    ///
    /// # Errors
    /// Returns error if the config cannot be loaded or is invalid.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?;
        config.apply_overrides(opts.api_base_ref(), opts.delay);
        config.validate()?;

        debug!("Using catalog service at {}", config.api_base);
        let client: Arc<dyn CatalogApi> = Arc::new(CatalogClient::new(
            &config.api_base,
            config.delay,
        )?);

        Ok(Self::with_client(config, client, opts.format))
    }

    /// Build a context around an existing client; reads and writes share it.
    pub fn with_client(config: Config, client: Arc<dyn CatalogApi>, format: OutputFormat) -> Self {
        let cache = QueryCache::new(CachePolicy::from(&config.cache));
        let queries = CatalogQueries::new(Arc::clone(&client), cache.clone());
        let mutations = CatalogMutations::new(client, cache.clone());

        Self {
            config,
            cache,
            queries,
            mutations,
            format,
        }
    }

    /// Configured page size as list parameters for the first page.
    pub fn first_page(&self) -> ListParams {
        ListParams::new(self.page_size())
    }

    pub fn page_size(&self) -> u64 {
        self.config.page_size as u64
    }
}

impl Drop for CommandContext {
    fn drop(&mut self) {
        self.cache.clear();
    }
}
