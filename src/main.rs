//! formkit - validate declarative form definitions from the command line
//!
//! # Commands
//!
//! - `check <definition>` - instantiate the form, replay events, print its state
//! - `submit <definition>` - same, then run the submission gate with a
//!   dry-run sink that prints the payload

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use formkit::{
    submit, EngineConfig, Form, FormDefinition, FormEvent, Submission, SubmissionSink,
    SubmitOutcome,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Validate declarative form definitions.
#[derive(Parser)]
#[command(name = "formkit")]
#[command(about = "Validate declarative form definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Print the state of a form after replaying events.
    ///
    /// Exits with status 1 when the form is invalid.
    Check {
        /// Form definition (JSON)
        definition: PathBuf,

        /// Event script (JSON array of set_value / touch events)
        #[arg(short, long)]
        events: Option<PathBuf>,
    },

    /// Run the submission gate and print the payload that would be sent.
    Submit {
        /// Form definition (JSON)
        definition: PathBuf,

        /// Event script (JSON array of set_value / touch events)
        #[arg(short, long)]
        events: Option<PathBuf>,

        /// Value received for the honeypot field
        #[arg(long)]
        honeypot: Option<String>,
    },
}

/// Sink that prints submissions instead of sending them
struct StdoutSink;

#[async_trait]
impl SubmissionSink for StdoutSink {
    async fn deliver(&mut self, submission: Submission) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(&submission)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formkit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::load().context("Failed to load engine config")?;

    let succeeded = match cli.command {
        Commands::Check { definition, events } => {
            let form = load_form(&definition, events.as_deref(), &config)?;
            println!("{}", serde_json::to_string_pretty(&form.snapshot())?);
            form.is_valid()
        }
        Commands::Submit {
            definition,
            events,
            honeypot,
        } => {
            let form = load_form(&definition, events.as_deref(), &config)?;
            let outcome = submit(&form, honeypot.as_deref(), &mut StdoutSink).await?;
            match outcome {
                SubmitOutcome::Delivered { .. } => true,
                SubmitOutcome::Blocked { report } => {
                    eprintln!("Submission blocked:");
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    false
                }
                SubmitOutcome::Discarded => {
                    eprintln!("Submission discarded: honeypot field was filled");
                    false
                }
            }
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

/// Build a form from a definition file and replay an optional event script
fn load_form(definition: &Path, events: Option<&Path>, config: &EngineConfig) -> Result<Form> {
    let content = fs::read_to_string(definition)
        .with_context(|| format!("Failed to read {}", definition.display()))?;
    let mut definition = FormDefinition::from_json(&content)?;
    config.apply_to(&mut definition.options);
    let mut form = Form::from_definition(definition)?.with_policy(config.policy());

    if let Some(path) = events {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let events: Vec<FormEvent> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse events in {}", path.display()))?;
        for event in &events {
            form.apply(event)?;
        }
        tracing::debug!("Replayed {} events", events.len());
    }

    Ok(form)
}
