//! Category commands

use log::debug;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::error::Result;
use crate::models::CategoryDisplay;
use crate::output::Formattable;

/// Run the category list command
pub async fn list(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let categories = ctx.queries.categories().await?;
    debug!("Fetched {} categories", categories.len());

    let rows: Vec<CategoryDisplay> = categories.iter().map(CategoryDisplay::from).collect();
    rows.print(ctx.format)
}
