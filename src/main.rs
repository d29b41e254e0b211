//! Catalogop CLI - companion for a hosted product catalog

use clap::Parser;
use colored::Colorize;
use log::LevelFilter;

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;

use cli::args::GlobalOptions;
use cli::{CacheCommands, CategoryCommands, Cli, Commands, ConfigCommands, ProductCommands};
use error::{Error, Result};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        match err {
            Error::Validation(ref e) => {
                eprintln!("{} Invalid product form", "Error:".red().bold());
                output::print_field_errors(e);
            }
            ref other => eprintln!("{} {}", "Error:".red().bold(), other),
        }
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_module("catalogop", LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("catalogop version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Product(cmd) => match cmd {
            ProductCommands::List { list } => cli::product::list(&opts, &list).await,
            ProductCommands::Get { id } => cli::product::get(&opts, id).await,
            ProductCommands::Create { fields } => cli::product::create(&opts, &fields).await,
            ProductCommands::Update { id, fields } => {
                cli::product::update(&opts, id, &fields).await
            }
            ProductCommands::Delete { id, yes } => cli::product::delete(&opts, id, yes).await,
        },
        Commands::Category(CategoryCommands::List) => cli::category::list(&opts).await,
        Commands::Browse => cli::browse::run(&opts).await,
        Commands::Cache(CacheCommands::Status { warm }) => cli::cache::status(&opts, warm).await,
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Init { force } => cli::config::init(&opts, force),
            ConfigCommands::Show => cli::config::show(&opts),
        },
    }
}
