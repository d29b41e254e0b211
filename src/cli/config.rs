//! Configuration file commands

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::output::json::format_json;

/// Write a default configuration file, keeping any `--api-base` or
/// `--delay` given on the command line.
pub fn init(opts: &GlobalOptions, force: bool) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;
    if path.exists() && !force {
        return Err(ConfigError::Invalid(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))
        .into());
    }

    let mut config = Config::default();
    config.apply_overrides(opts.api_base_ref(), opts.delay);
    config.validate()?;
    config.save_to(&path)?;

    println!(
        "{} Configuration saved to: {}",
        "✓".green(),
        path.display()
    );
    println!("\n{}", "Try running:".bold());
    println!("  {} - Show configuration status", "catalogop status".cyan());
    println!("  {} - Browse the catalog", "catalogop browse".cyan());

    Ok(())
}

/// Print the effective configuration
pub fn show(opts: &GlobalOptions) -> Result<()> {
    let mut config = Config::load_at(opts.config_ref())?;
    config.apply_overrides(opts.api_base_ref(), opts.delay);

    match opts.format {
        OutputFormat::Json => println!("{}", format_json(&config)?),
        OutputFormat::Pretty | OutputFormat::Table => {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            print!("{}", yaml);
        }
    }
    Ok(())
}
