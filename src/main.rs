//! Binary entry point.

use clap::Parser as _;
use tracing_subscriber::EnvFilter;

use agri_agent::cli::{Cli, Command, commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; environment variables win either way.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Ask { question, json } => commands::ask(&question, json).await,
        Command::Keys => commands::keys(),
    }
}
