//! whpetitions - petition response-time statistics with a cached front page

use clap::Parser;
use colored::Colorize;

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod refresh;
mod render;
mod server;
mod site;
mod stats;
mod store;

use cli::{AppContext, CacheCommands, Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Commands::Version = cli.command {
        println!("whpetitions version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let ctx = AppContext::new(&cli)?;

    match cli.command {
        Commands::Serve { ref bind } => cli::serve::run(&ctx, bind.as_deref()).await,
        Commands::Refresh { partition } => cli::refresh::run(&ctx, partition).await,
        Commands::Status => cli::status::run(&ctx),
        Commands::Cache(CacheCommands::Status) => cli::cache::status(&ctx),
        Commands::Cache(CacheCommands::Clear) => cli::cache::clear(&ctx),
        Commands::Version => Ok(()),
    }
}
