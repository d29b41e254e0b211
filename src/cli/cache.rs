//! Cache inspection commands

use colored::Colorize;

use crate::cache::QueryCache;
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::{CacheEntryDisplay, CachePolicyDisplay};
use crate::output::Formattable;
use crate::output::json::format_json;

/// Show cache policy and entries, optionally after loading the views the
/// dashboard opens with.
pub async fn status(opts: &GlobalOptions, warm: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    if warm {
        let first_page = ctx.first_page();
        let (page, categories) = tokio::join!(
            ctx.queries.products(&first_page),
            ctx.queries.categories()
        );
        page?;
        categories?;
    }

    print_status(&ctx.cache, ctx.format)
}

pub(crate) fn print_status(cache: &QueryCache, format: OutputFormat) -> Result<()> {
    let policy = CachePolicyDisplay::rows(cache.policy());
    let entries: Vec<CacheEntryDisplay> = cache
        .entries()
        .iter()
        .map(CacheEntryDisplay::from)
        .collect();
    let stats = cache.stats();

    if format == OutputFormat::Json {
        let json = serde_json::json!({
            "policy": policy,
            "retry": {
                "attempts": cache.policy().retry.attempts,
                "delay_ms": cache.policy().retry.delay.as_millis() as u64,
            },
            "stats": stats,
            "entries": entries,
        });
        println!("{}", format_json(&json)?);
        return Ok(());
    }

    println!("{}", "Cache Policy".bold());
    policy.print(format)?;
    println!(
        "Reads are attempted {} time(s), {}ms apart",
        cache.policy().retry.attempts,
        cache.policy().retry.delay.as_millis()
    );

    println!();
    println!("{}", "Cache Entries".bold());
    if entries.is_empty() {
        println!("No cached queries. Use --warm to load the first page and categories.");
    } else {
        entries.print(format)?;
        println!(
            "{} total, {} fresh, {} stale, {} fetching, {} errored",
            stats.total, stats.fresh, stats.stale, stats.fetching, stats.errored
        );
    }

    Ok(())
}
