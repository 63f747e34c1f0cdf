use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    AuthCommand, CartCommand, ConfigCommand, Context, ItemCommand, ItemsCommand, ShopCommand,
};
use config::Config;

const DEFAULT_LOG_FILTER: &str = "market=warn,marketplace_core=warn";

#[derive(Parser)]
#[command(name = "market")]
#[command(version)]
#[command(about = "Browse the marketplace, fill your cart and run your shops", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register, log in and out
    Auth(AuthCommand),

    /// Browse items for sale
    Items(ItemsCommand),

    /// Manage your shopping cart (customers)
    Cart(CartCommand),

    /// Manage your shops (sellers)
    Shop(ShopCommand),

    /// Manage shop inventory (sellers)
    Item(ItemCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    // Save config path for init command
    let cli_config_path = cli.config.clone();
    let config = Config::load(cli.config)?;

    match &cli.command {
        Some(Commands::Config(cmd)) => cmd.run(&config, cli_config_path),
        Some(command) => {
            let context = Context::from_config(&config)?;
            execute_command(command, &context)
        }
        None => {
            println!("Use --help to see available commands");
            Ok(())
        }
    }
}

fn execute_command(
    command: &Commands,
    context: &Context,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Auth(cmd) => cmd.run(context),
        Commands::Items(cmd) => cmd.run(context),
        Commands::Cart(cmd) => cmd.run(context),
        Commands::Shop(cmd) => cmd.run(context),
        Commands::Item(cmd) => cmd.run(context),
        Commands::Config(_) => Ok(()),
    }
}

/// Logs go to stderr so command output stays clean.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
