//! Argument parsing.

use clap::{Parser, Subcommand};

/// Agricultural advisory agent for farmer questions.
#[derive(Debug, Parser)]
#[command(name = "agri-agent", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ask the agent a question.
    Ask {
        /// The farmer's question.
        question: String,

        /// Emit the full result as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Show API key pool configuration status.
    Keys,
}

impl Cli {
    /// Maps the verbosity count to a tracing filter directive.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "agri_agent=info",
            1 => "agri_agent=debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from(["agri-agent", "ask", "when to sow wheat?"])
            .unwrap_or_else(|_| unreachable!());
        match cli.command {
            Command::Ask { question, json } => {
                assert_eq!(question, "when to sow wheat?");
                assert!(!json);
            }
            Command::Keys => unreachable!(),
        }
    }

    #[test]
    fn test_parse_ask_json() {
        let cli = Cli::try_parse_from(["agri-agent", "ask", "--json", "q"])
            .unwrap_or_else(|_| unreachable!());
        assert!(matches!(cli.command, Command::Ask { json: true, .. }));
    }

    #[test]
    fn test_parse_keys_with_verbosity() {
        let cli = Cli::try_parse_from(["agri-agent", "-vv", "keys"])
            .unwrap_or_else(|_| unreachable!());
        assert!(matches!(cli.command, Command::Keys));
        assert_eq!(cli.log_filter(), "trace");
    }

    #[test]
    fn test_missing_subcommand_fails() {
        assert!(Cli::try_parse_from(["agri-agent"]).is_err());
    }
}
