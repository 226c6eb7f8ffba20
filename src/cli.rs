//! Defines the command-line interface structure using clap.

use crate::api::OptionCount;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "smartgpt",
    version,
    about = "Ask an LLM for several answers, let it critique them, and get the improved best one"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file to use instead of ~/.smartgpt/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Defaults to `ask` when omitted
    #[command(subcommand)]
    pub command: Option<Cmd>,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Answer a single question (prompts for anything not given as a flag)
    Ask(AskArgs),
    /// Ask several questions in a row with the same API key and model
    Interactive(SessionArgs),
    /// List the configured models
    Models,
}

/// Inputs shared by every question of a session.
#[derive(Args, Default)]
pub struct SessionArgs {
    /// API key for the completion service
    #[arg(long, env = "SMARTGPT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Model to use; must be one of the configured models
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Args, Default)]
pub struct AskArgs {
    /// The question to answer
    pub question: Option<String>,
    /// Number of answer options to generate (at least 3)
    #[arg(long)]
    pub count: Option<OptionCount>,
    #[command(flatten)]
    pub session: SessionArgs,
    /// Print the answer options and the critique before the answer
    #[arg(long)]
    pub show_work: bool,
    /// Print the full run as JSON
    #[arg(long, conflicts_with = "show_work")]
    pub json: bool,
    /// Copy the final answer to the clipboard
    #[arg(long)]
    pub copy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_below_three_is_rejected() {
        for n in ["0", "1", "2"] {
            assert!(Cli::try_parse_from(["smartgpt", "ask", "--count", n, "q"]).is_err());
        }
    }

    #[test]
    fn ask_flags_parse() {
        let cli = Cli::try_parse_from([
            "smartgpt",
            "ask",
            "--count",
            "3",
            "--model",
            "gpt-4",
            "--show-work",
            "What is the capital of France?",
        ])
        .unwrap();

        match cli.command {
            Some(Cmd::Ask(args)) => {
                assert_eq!(args.count.map(OptionCount::get), Some(3));
                assert_eq!(args.session.model.as_deref(), Some("gpt-4"));
                assert_eq!(args.question.as_deref(), Some("What is the capital of France?"));
                assert!(args.show_work);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn json_conflicts_with_show_work() {
        assert!(Cli::try_parse_from(["smartgpt", "ask", "--json", "--show-work", "q"]).is_err());
    }

    #[test]
    fn subcommand_is_optional() {
        let cli = Cli::try_parse_from(["smartgpt", "-vv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);
    }
}
