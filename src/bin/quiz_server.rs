use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quiz_generator::clients::ClientType;
use quiz_generator::export::ResultsExport;
use quiz_generator::{score, validate_str, AppConfig, UserAnswerSet};

#[derive(Parser)]
#[command(author, version, about = "Quiz generation and scoring server", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    ANTHROPIC_API_KEY  API key for Claude (CLAUDE_API_KEY also accepted)
    GEMINI_API_KEY     API key for Gemini
    OPENAI_API_KEY     API key for OpenAI chat, speech and images
    QUIZ_PROVIDER      Default provider (claude|gemini|openai|mock)
    QUIZ_CAPTURE_DIR   Save every prompt and raw reply into this directory
    RUST_LOG           Log filter [default: info]")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        /// Default text provider
        #[arg(long)]
        provider: Option<ClientType>,
    },
    /// Score a saved quiz against an answers file and print the result
    Score {
        /// Quiz JSON, as produced by a model or saved from the API
        #[arg(long)]
        quiz: PathBuf,
        /// JSON object mapping question ids to arrays of selected answer texts
        #[arg(long)]
        answers: PathBuf,
        /// Also write quiz-results-YYYY-MM-DD.json into this directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Command::Serve { host, port, provider } => {
            let mut config = AppConfig::from_env().context("invalid configuration")?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(provider) = provider {
                config.default_provider = provider;
            }
            quiz_generator::server::serve(config).await
        }
        Command::Score { quiz, answers, out } => {
            let raw_quiz = tokio::fs::read_to_string(&quiz)
                .await
                .with_context(|| format!("reading {}", quiz.display()))?;
            let quiz = validate_str(&raw_quiz).context("quiz file failed validation")?;

            let raw_answers = tokio::fs::read_to_string(&answers)
                .await
                .with_context(|| format!("reading {}", answers.display()))?;
            let answers: UserAnswerSet =
                serde_json::from_str(&raw_answers).context("answers file is not a valid answer set")?;

            let result = score(&quiz, &answers);
            println!("{}", serde_json::to_string_pretty(&result)?);

            if let Some(dir) = out {
                let path = ResultsExport::today(&result)?.write_to(&dir).await?;
                eprintln!("saved {}", path.display());
            }
            Ok(())
        }
    }
}
