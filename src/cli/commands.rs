//! Subcommand execution. Command output goes to stdout.
#![allow(clippy::print_stdout)]

use anyhow::Context as _;

use crate::agent::AgriAgent;
use crate::agent::keypool::KeyPool;
use crate::config::AgriConfig;

/// Runs `ask`: full pipeline for one question.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or the agent cannot
/// be constructed. Question processing itself never fails.
pub async fn ask(question: &str, json: bool) -> anyhow::Result<()> {
    let config = AgriConfig::from_env().context("loading configuration")?;
    let agent = AgriAgent::from_config(&config).context("building agent")?;
    let result = agent.query(question).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("serializing result")?
        );
    } else {
        println!("{}", result.answer);
        println!();
        println!("Sources consulted: {}", result.tools_used.join(", "));
    }
    Ok(())
}

/// Runs `keys`: prints the credential pool status.
///
/// # Errors
///
/// Returns an error if no API key is configured.
pub fn keys() -> anyhow::Result<()> {
    let config = AgriConfig::from_env().context("loading configuration")?;
    let pool = KeyPool::new(config.api_keys, config.key_cooldown);
    let status = pool.status();
    println!(
        "{}",
        serde_json::to_string_pretty(&status).context("serializing status")?
    );
    Ok(())
}
