//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::{Config, DEFAULT_API_BASE};
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "Catalogop Configuration Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;
    if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
    } else {
        println!(
            "{} No config file at {} (using defaults)",
            "○".dimmed(),
            config_path.display()
        );
        println!("  → Run 'catalogop config init' to create one");
    }

    let mut config = match Config::load_at(opts.config_ref()) {
        Ok(config) => config,
        Err(e) => {
            println!("{} Configuration invalid: {}", "✗".red(), e);
            println!();
            return Ok(());
        }
    };
    config.apply_overrides(opts.api_base_ref(), opts.delay);

    println!();
    match config.validate() {
        Ok(()) => println!("{} Configuration valid", "✓".green()),
        Err(e) => println!("{} {}", "✗".red(), e),
    }

    if config.api_base == DEFAULT_API_BASE {
        println!("{} Catalog service: {}", "✓".green(), config.api_base);
    } else {
        println!(
            "{} Custom catalog service: {}",
            "○".dimmed(),
            config.api_base.cyan()
        );
    }

    println!("{} Page size: {}", "✓".green(), config.page_size);
    println!(
        "{} Service delay: list {}ms, detail {}ms, write {}ms",
        "○".dimmed(),
        config.delay.read_ms,
        config.delay.detail_ms,
        config.delay.write_ms
    );
    println!(
        "{} Cache: products stale after {}s, categories after {}s, product after {}s",
        "○".dimmed(),
        config.cache.product_list_stale_secs,
        config.cache.categories_stale_secs,
        config.cache.product_stale_secs
    );
    println!();

    Ok(())
}
