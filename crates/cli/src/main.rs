//! Sentiment CLI
//!
//! A command-line client for the sentiment classification service: check
//! health, inspect the loaded model and classify texts.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{predict, service};
use std::path::PathBuf;
use std::process::ExitCode;

/// Sentiment CLI
#[derive(Parser)]
#[command(name = "sentiment")]
#[command(author, version, long_about = None)]
#[command(about = "CLI for the Sentiment classification service")]
pub struct Cli {
    /// API endpoint URL [default: http://localhost:8000]
    #[arg(long, env = "SENTIMENT_API_URL")]
    pub api_url: Option<String>,

    /// API key sent as X-API-Key
    #[arg(long, env = "SENTIMENT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the service is up
    Health,

    /// Show the loaded model's name, version and labels
    Meta,

    /// Classify a single text
    Predict {
        /// Text to classify
        text: String,
    },

    /// Classify several texts in one request
    Batch {
        /// Texts to classify
        texts: Vec<String>,

        /// Read additional texts from a file, one per line
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let client = client::ApiClient::new(
        &config.resolve_api_url(cli.api_url),
        config.resolve_api_key(cli.api_key),
    )?;

    match cli.command {
        Commands::Health => service::health(&client, cli.format).await,
        Commands::Meta => service::meta(&client, cli.format).await,
        Commands::Predict { text } => predict::predict(&client, &text, cli.format).await,
        Commands::Batch { texts, file } => {
            predict::batch(&client, texts, file.as_deref(), cli.format).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_batch_with_file() {
        let cli = Cli::try_parse_from([
            "sentiment",
            "--api-url",
            "http://127.0.0.1:9000",
            "--format",
            "json",
            "batch",
            "good",
            "bad",
            "--file",
            "texts.txt",
        ])
        .unwrap();

        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert!(matches!(cli.format, output::OutputFormat::Json));
        match cli.command {
            Commands::Batch { texts, file } => {
                assert_eq!(texts, vec!["good", "bad"]);
                assert_eq!(file, Some(PathBuf::from("texts.txt")));
            }
            _ => panic!("expected batch command"),
        }
    }

    #[test]
    fn test_predict_requires_text() {
        assert!(Cli::try_parse_from(["sentiment", "predict"]).is_err());
    }
}
