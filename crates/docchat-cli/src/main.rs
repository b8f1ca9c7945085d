//! DocChat CLI
//!
//! Chat with a PDF from the terminal.

use anyhow::Result;
use clap::Parser;
use docchat_core::error::exit_codes;
use docchat_core::{Config, DocChatError};

mod app;
mod commands;
mod input;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<DocChatError>()
            .map(DocChatError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Chat(args) => commands::chat::run(args, config, cli.verbose).await,
        Commands::Ask(args) => commands::ask::run(args, config, cli.format).await,
        Commands::Index(args) => commands::index::run(args, config, cli.format).await,
        Commands::Route(args) => commands::route::run(args, &config, cli.format),
        Commands::Schedule => commands::schedule::run(cli.format).await,
        Commands::Config => commands::config::run(&config, &config_path, cli.format),
    }
}
