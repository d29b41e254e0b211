//! Interactive catalog dashboard
//!
//! Shows one page of products at a time and loops over a menu of actions.
//! The displayed page stays observed in the query cache, so a write
//! refreshes it right away; other pages refresh when next visited.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::cache::{MutationKind, Notification, QueryKey};
use crate::cli::args::GlobalOptions;
use crate::cli::cache::print_status;
use crate::cli::product::{print_page, print_product};
use crate::cli::{CommandContext, OutputFormat};
use crate::client::models::{PageCursor, category_label};
use crate::client::{ListParams, Product, ProductFormData, ProductPage};
use crate::error::{Error, Result};
use crate::output::{print_field_errors, print_notification};

/// Position and filters of the product table
struct View {
    cursor: PageCursor,
    search: String,
    category: String,
}

impl View {
    fn new(limit: u64) -> Self {
        Self {
            cursor: PageCursor::new(limit),
            search: String::new(),
            category: String::new(),
        }
    }

    fn params(&self) -> ListParams {
        ListParams::new(self.cursor.limit)
            .skip(self.cursor.skip())
            .search(self.search.as_str())
            .category(self.category.as_str())
    }

    fn set_search(&mut self, search: &str) {
        self.search = search.trim().to_string();
        self.category.clear();
        self.cursor.reset();
    }

    fn set_category(&mut self, category: Option<String>) {
        self.category = category.unwrap_or_default();
        self.search.clear();
        self.cursor.reset();
    }

    fn clear_filters(&mut self) {
        self.search.clear();
        self.category.clear();
        self.cursor.reset();
    }

    fn is_filtered(&self) -> bool {
        self.params().is_filtered()
    }

    fn title(&self) -> String {
        if !self.search.is_empty() {
            format!("Products matching \"{}\"", self.search)
        } else if !self.category.is_empty() {
            format!("Products in {}", category_label(&self.category))
        } else {
            "All products".to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Retry,
    Next,
    Previous,
    Search,
    Category,
    ClearFilters,
    Refresh,
    View,
    Add,
    Edit,
    Delete,
    CacheStatus,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::Retry => "Retry",
            Action::Next => "Next page",
            Action::Previous => "Previous page",
            Action::Search => "Search",
            Action::Category => "Filter by category",
            Action::ClearFilters => "Clear filters",
            Action::Refresh => "Refresh",
            Action::View => "View product",
            Action::Add => "Add product",
            Action::Edit => "Edit product",
            Action::Delete => "Delete product",
            Action::CacheStatus => "Cache status",
            Action::Quit => "Quit",
        }
    }
}

/// Menu entries that make sense for the current page
fn actions_for(page: Option<&ProductPage>, view: &View) -> Vec<Action> {
    let mut actions = Vec::new();

    match page {
        None => actions.push(Action::Retry),
        Some(page) => {
            if page.has_next() {
                actions.push(Action::Next);
            }
            if page.has_previous() {
                actions.push(Action::Previous);
            }
        }
    }
    actions.extend([Action::Search, Action::Category]);
    if view.is_filtered() {
        actions.push(Action::ClearFilters);
    }
    if page.is_some() {
        actions.push(Action::Refresh);
    }

    let has_products = page.is_some_and(|p| !p.products.is_empty());
    if has_products {
        actions.push(Action::View);
    }
    actions.push(Action::Add);
    if has_products {
        actions.extend([Action::Edit, Action::Delete]);
    }
    actions.extend([Action::CacheStatus, Action::Quit]);
    actions
}

/// Run the interactive dashboard
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let theme = ColorfulTheme::default();
    let mut view = View::new(ctx.page_size());
    let mut refresh = false;
    // Set after a write: wait for the refresh it triggered
    let mut settle = false;

    loop {
        ctx.cache.collect_garbage();
        let params = view.params();
        let key = QueryKey::from(&params);
        let _observer = ctx.queries.watch_products(&params);

        let in_flight = ctx.cache.state(&key).is_some_and(|state| state.is_fetching());
        let loaded = if refresh || (settle && in_flight) {
            with_spinner("Refreshing products...", ctx.queries.refetch_products(&params)).await
        } else {
            load(&ctx, &key, "Loading products...", ctx.queries.products(&params)).await
        };
        refresh = false;
        settle = false;

        println!();
        println!("{}", view.title().bold());
        let page = match loaded {
            Ok(page) => {
                print_page(&page, OutputFormat::Pretty)?;
                if ctx.cache.state(&key).is_some_and(|state| state.is_fetching()) {
                    println!("{}", "Refreshing in background...".dimmed());
                }
                Some(page)
            }
            Err(e) => {
                eprintln!("{} Failed to load products: {}", "✗".red(), e);
                None
            }
        };

        let actions = actions_for(page.as_deref(), &view);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let Some(choice) = Select::with_theme(&theme)
            .with_prompt("Action")
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            break;
        };

        debug!("Browse action: {:?}", actions[choice]);
        match actions[choice] {
            Action::Retry | Action::Refresh => refresh = true,
            Action::Next => {
                if let Some(ref page) = page {
                    view.cursor.next(page.total_pages());
                }
            }
            Action::Previous => view.cursor.previous(),
            Action::Search => {
                let search: String = Input::with_theme(&theme)
                    .with_prompt("Search")
                    .with_initial_text(view.search.clone())
                    .allow_empty(true)
                    .interact_text()?;
                view.set_search(&search);
            }
            Action::Category => choose_category(&ctx, &theme, &mut view).await?,
            Action::ClearFilters => view.clear_filters(),
            Action::View => {
                if let Some(product) = pick_product(&theme, page.as_deref())? {
                    let id = product.id;
                    let loaded = load(
                        &ctx,
                        &QueryKey::Product(id),
                        "Loading product...",
                        ctx.queries.product(id),
                    )
                    .await;
                    match loaded {
                        Ok(product) => print_product(&product, OutputFormat::Pretty)?,
                        Err(e) => eprintln!("{} {}", "✗".red(), e),
                    }
                }
            }
            Action::Add => {
                let categories = load_categories(&ctx).await;
                let mutations = &ctx.mutations;
                settle = submit_form(
                    &theme,
                    MutationKind::Create,
                    ProductFormData::default(),
                    &categories,
                    move |form| async move { mutations.create(&form).await },
                )
                .await?;
            }
            Action::Edit => {
                if let Some(picked) = pick_product(&theme, page.as_deref())? {
                    let id = picked.id;
                    // Keeps the product observed so the write refreshes it
                    let _product_observer = ctx.queries.watch_product(id);
                    let loaded = load(
                        &ctx,
                        &QueryKey::Product(id),
                        "Loading product...",
                        ctx.queries.product(id),
                    )
                    .await;
                    let original = match loaded {
                        Ok(product) => product,
                        Err(e) => {
                            eprintln!("{} {}", "✗".red(), e);
                            continue;
                        }
                    };
                    let categories = load_categories(&ctx).await;
                    let mutations = &ctx.mutations;
                    let original_ref: &Product = &original;
                    settle = submit_form(
                        &theme,
                        MutationKind::Update,
                        ProductFormData::from(original_ref),
                        &categories,
                        move |form| async move {
                            mutations.update(id, &form.changes_from(original_ref)).await
                        },
                    )
                    .await?;
                }
            }
            Action::Delete => {
                if let Some(product) = pick_product(&theme, page.as_deref())? {
                    let confirm = Confirm::with_theme(&theme)
                        .with_prompt(format!("Delete \"{}\"?", product.title))
                        .default(false)
                        .interact()?;
                    if confirm {
                        let result =
                            with_spinner("Deleting product...", ctx.mutations.delete(product.id))
                                .await;
                        if let Some(notification) =
                            Notification::for_result(MutationKind::Delete, &result)
                        {
                            print_notification(&notification);
                        }
                        settle = result.is_ok();
                    }
                }
            }
            Action::CacheStatus => print_status(&ctx.cache, OutputFormat::Pretty)?,
            Action::Quit => break,
        }
    }

    Ok(())
}

/// Await `fut`, with a spinner only when `key` has nothing to show yet.
/// Cached data, even stale, comes back immediately.
async fn load<F: Future>(
    ctx: &CommandContext,
    key: &QueryKey,
    message: &str,
    fut: F,
) -> F::Output {
    let has_data = ctx
        .cache
        .state(key)
        .is_some_and(|state| state.data().is_some());

    if has_data {
        fut.await
    } else {
        with_spinner(message, fut).await
    }
}

async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = fut.await;
    spinner.finish_and_clear();
    output
}

/// Categories for the form and filter pickers; empty when they cannot be
/// loaded, in which case the form asks for a slug instead.
async fn load_categories(ctx: &CommandContext) -> Arc<Vec<String>> {
    match load(
        ctx,
        &QueryKey::Categories,
        "Loading categories...",
        ctx.queries.categories(),
    )
    .await
    {
        Ok(categories) => categories,
        Err(e) => {
            eprintln!("{} Failed to load categories: {}", "⚠".yellow(), e);
            Arc::new(Vec::new())
        }
    }
}

async fn choose_category(
    ctx: &CommandContext,
    theme: &ColorfulTheme,
    view: &mut View,
) -> Result<()> {
    let categories = load_categories(ctx).await;
    if categories.is_empty() {
        return Ok(());
    }

    let mut items = vec!["All categories".to_string()];
    items.extend(categories.iter().map(|c| category_label(c)));
    let current = categories
        .iter()
        .position(|c| *c == view.category)
        .map_or(0, |i| i + 1);

    let selection = Select::with_theme(theme)
        .with_prompt("Category")
        .items(&items)
        .default(current)
        .interact_opt()?;

    match selection {
        None => {}
        Some(0) => view.set_category(None),
        Some(i) => view.set_category(categories.get(i - 1).cloned()),
    }
    Ok(())
}

fn pick_product<'a>(
    theme: &ColorfulTheme,
    page: Option<&'a ProductPage>,
) -> Result<Option<&'a Product>> {
    let Some(page) = page else {
        return Ok(None);
    };
    let items: Vec<String> = page
        .products
        .iter()
        .map(|p| format!("#{} {}", p.id, p.title))
        .collect();

    let selection = Select::with_theme(theme)
        .with_prompt("Product")
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(selection.and_then(|i| page.products.get(i)))
}

fn prompt_form(
    theme: &ColorfulTheme,
    initial: &ProductFormData,
    categories: &[String],
) -> Result<ProductFormData> {
    let title: String = Input::with_theme(theme)
        .with_prompt("Title")
        .with_initial_text(initial.title.clone())
        .allow_empty(true)
        .interact_text()?;

    let description: String = Input::with_theme(theme)
        .with_prompt("Description")
        .with_initial_text(initial.description.clone())
        .allow_empty(true)
        .interact_text()?;

    let category: String = if categories.is_empty() {
        Input::with_theme(theme)
            .with_prompt("Category")
            .with_initial_text(initial.category.clone())
            .allow_empty(true)
            .interact_text()?
    } else {
        let labels: Vec<String> = categories.iter().map(|c| category_label(c)).collect();
        let current = categories
            .iter()
            .position(|c| *c == initial.category)
            .unwrap_or(0);
        let index = Select::with_theme(theme)
            .with_prompt("Category")
            .items(&labels)
            .default(current)
            .interact()?;
        categories[index].clone()
    };

    let price: f64 = Input::with_theme(theme)
        .with_prompt("Price ($)")
        .with_initial_text(initial.price.to_string())
        .interact_text()?;

    let stock: i64 = Input::with_theme(theme)
        .with_prompt("Stock")
        .with_initial_text(initial.stock.to_string())
        .interact_text()?;

    let brand: String = Input::with_theme(theme)
        .with_prompt("Brand (optional)")
        .with_initial_text(initial.brand.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let mut form = ProductFormData {
        title,
        description,
        category,
        price,
        stock,
        brand: None,
    };
    form.set_brand(&brand);
    Ok(form)
}

/// Prompt for a form and submit it until it is saved or the user gives up.
/// Entered data survives validation failures and failed writes. Returns
/// whether the write went through.
async fn submit_form<S, Fut>(
    theme: &ColorfulTheme,
    kind: MutationKind,
    initial: ProductFormData,
    categories: &[String],
    submit: S,
) -> Result<bool>
where
    S: Fn(ProductFormData) -> Fut,
    Fut: Future<Output = Result<Product>>,
{
    let mut form = prompt_form(theme, &initial, categories)?;

    loop {
        let outcome = match form.validate() {
            Err(e) => Err(Error::Validation(e)),
            Ok(()) => with_spinner("Saving...", submit(form.clone())).await,
        };

        match outcome {
            Ok(product) => {
                print_notification(&Notification::success(kind));
                print_product(&product, OutputFormat::Pretty)?;
                return Ok(true);
            }
            Err(Error::Validation(e)) => {
                eprintln!("{}", "Please fix the following:".red());
                print_field_errors(&e);
                let again = Confirm::with_theme(theme)
                    .with_prompt("Edit the form again?")
                    .default(true)
                    .interact()?;
                if !again {
                    return Ok(false);
                }
                form = prompt_form(theme, &form, categories)?;
            }
            Err(e) => {
                print_notification(&Notification::failure(&e));
                let choice = Select::with_theme(theme)
                    .with_prompt("The change was not saved")
                    .items(&["Retry", "Edit form", "Cancel"])
                    .default(0)
                    .interact()?;
                match choice {
                    0 => {}
                    1 => form = prompt_form(theme, &form, categories)?,
                    _ => return Ok(false),
                }
            }
        }
    }
}
