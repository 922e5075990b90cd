//! kbassist - terminal client entry point

use anyhow::Result;
use clap::Parser;
use kbassist::cli::{Args, Commands};
use kbassist::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match &args.command {
        Commands::Ask { question } => {
            kbassist::cli::run_ask(&config, question, args.lexical).await?;
        }
        Commands::Search { query, limit } => {
            kbassist::cli::run_search(&config, query, *limit, args.lexical).await?;
        }
        Commands::Config => {
            kbassist::cli::run_config(&config)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "kbassist=warn",
        1 => "kbassist=info",
        _ => "kbassist=debug",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
