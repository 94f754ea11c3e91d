use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use askform::config::ConfigError;
use askform::logging::{self, LogTarget};
use askform::{AnswerClientBuilder, AnswerText, Controller, Settings, SettingsBuilder};
use clap::{Args, Parser, Subcommand};

/// askform - ask a question, get an answer from the answer service
#[derive(Parser)]
#[command(name = "askform")]
#[command(about = "Ask questions to a local answer service")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(Args)]
struct ServiceArgs {
    /// Base URL of the answer service (default: http://127.0.0.1:5000)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Request timeout in seconds (default: none)
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive question form
    Tui,
    /// Ask a single question and print the answer
    Ask(AskCommand),
}

/// Ask a single question
#[derive(Args)]
struct AskCommand {
    /// The question to send, as-is
    #[arg(value_name = "QUESTION")]
    question: String,
}

/// Exit code when the request failed and the failure message was printed.
const EXIT_REQUEST_FAILED: i32 = 1;
/// Exit code for configuration and internal errors.
const EXIT_INTERNAL: i32 = 2;

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = resolve_settings(&cli.service)
        .map_err(anyhow::Error::from)
        .and_then(|settings| match &cli.command {
            Commands::Tui => handle_tui(&settings),
            Commands::Ask(cmd) => handle_ask(cmd, &settings),
        });

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e:#}");
            std::process::exit(EXIT_INTERNAL);
        }
    }
}

/// Applies CLI flags on top of environment and defaults.
fn resolve_settings(args: &ServiceArgs) -> Result<Settings, ConfigError> {
    let mut builder = SettingsBuilder::new();
    if let Some(url) = &args.api_url {
        builder = builder.api_url(url);
    }
    if let Some(secs) = args.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}

/// Runs the interactive form, logging to the configured file.
fn handle_tui(settings: &Settings) -> Result<i32> {
    logging::init(LogTarget::File(settings.log_file.clone()))?;
    askform::tui::run(settings)?;
    Ok(0)
}

/// Submits one question through the form controller and prints the result.
fn handle_ask(cmd: &AskCommand, settings: &Settings) -> Result<i32> {
    logging::init(LogTarget::Stderr)?;

    let client = AnswerClientBuilder::new()
        .base_url(&settings.api_url)
        .timeout(settings.timeout)
        .build()
        .context("Failed to create answer client")?;

    let mut controller = Controller::new(Arc::new(client), settings.locale.failure_message());
    controller.set_question(cmd.question.as_str());
    controller.submit();
    if !controller.wait_idle(None) {
        anyhow::bail!("request ended without a result");
    }

    Ok(print_answer(controller.state().answer()))
}

/// Prints the answer panel content to stdout and returns the exit code for it.
fn print_answer(answer: &AnswerText) -> i32 {
    match answer {
        AnswerText::Answer(text) => {
            println!("{text}");
            0
        }
        AnswerText::Empty => {
            println!();
            0
        }
        AnswerText::Failed(message) => {
            println!("{message}");
            EXIT_REQUEST_FAILED
        }
    }
}
