//! Product commands

use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};
use log::debug;

use crate::cache::{MutationKind, Notification};
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, CreateArgs, ListArgs, OutputFormat, UpdateArgs};
use crate::client::{Product, ProductFormData, ProductPage};
use crate::error::Result;
use crate::models::{ProductDisplay, product_fields};
use crate::output::json::format_json;
use crate::output::table::format_fields;
use crate::output::{Formattable, print_notification};

/// Run the product list command
pub async fn list(opts: &GlobalOptions, args: &ListArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let params = args.to_params(ctx.page_size());

    debug!("Listing products: {:?}", params);
    let page = ctx.queries.products(&params).await?;
    debug!("Fetched {} of {} products", page.products.len(), page.total);

    print_page(&page, ctx.format)
}

/// Run the product get command
pub async fn get(opts: &GlobalOptions, id: u64) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let product = ctx.queries.product(id).await?;

    print_product(&product, ctx.format)
}

/// Run the product create command
pub async fn create(opts: &GlobalOptions, args: &CreateArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let form = args.to_form();

    let result = ctx.mutations.create(&form).await;
    report(&ctx, MutationKind::Create, result)
}

/// Run the product update command.
///
/// The current product prefills the form, the flags are applied on top,
/// and only fields that differ are sent.
pub async fn update(opts: &GlobalOptions, id: u64, args: &UpdateArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let original = ctx.queries.product(id).await?;

    let mut form = ProductFormData::from(original.as_ref());
    args.apply(&mut form);
    form.validate()?;

    let patch = form.changes_from(&original);
    debug!("Changed fields: {:?}", patch.changed_fields());

    let result = ctx.mutations.update(id, &patch).await;
    report(&ctx, MutationKind::Update, result)
}

/// Run the product delete command
pub async fn delete(opts: &GlobalOptions, id: u64, yes: bool) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    if !yes {
        let product = ctx.queries.product(id).await?;
        let confirm = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete \"{}\" (#{})? This cannot be undone",
                product.title, product.id
            ))
            .default(false)
            .interact()?;

        if !confirm {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    let result = ctx.mutations.delete(id).await;
    report(&ctx, MutationKind::Delete, result)
}

/// Print the outcome of a write. Failures are returned for `main` to
/// report.
fn report(ctx: &CommandContext, kind: MutationKind, result: Result<Product>) -> Result<()> {
    let notification = Notification::for_result(kind, &result);
    let product = result?;

    if let Some(notification) = notification
        && ctx.format != OutputFormat::Json
    {
        print_notification(&notification);
    }
    print_product(&product, ctx.format)
}

pub(crate) fn print_page(page: &ProductPage, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", format_json(page)?);
        return Ok(());
    }

    let rows: Vec<ProductDisplay> = page.products.iter().map(ProductDisplay::from).collect();
    rows.print(format)?;

    if format == OutputFormat::Pretty {
        println!(
            "{}  {}",
            page.range_label().dimmed(),
            format!("Page {} of {}", page.current_page(), page.total_pages().max(1)).dimmed()
        );
    }
    Ok(())
}

pub(crate) fn print_product(product: &Product, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", format_json(product)?),
        OutputFormat::Table => vec![ProductDisplay::from(product)].print(format)?,
        OutputFormat::Pretty => println!("{}", format_fields(&product_fields(product))),
    }
    Ok(())
}
