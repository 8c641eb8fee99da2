use std::{io, path::PathBuf, process::ExitCode, sync::Arc};

use admission_cli::answers::{self, ScriptOutcome};
use admission_cli::{AppConfig, console, logging, open_form};
use admission_core::StaticSession;
use clap::Parser;
use tracing::{debug, info};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Multi-step school application intake.
///
/// Walks an applicant through student details, previous schooling, parent
/// details and address, then writes the application to the configured store.
#[derive(Debug, Parser)]
struct Cli {
    /// TOML config file. Missing keys take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Signed-in user id. Without one the form can be filled but not submitted.
    #[arg(long)]
    user: Option<String>,

    /// Name recorded as the submitter (defaults to the user id).
    #[arg(long, requires = "user")]
    name: Option<String>,

    /// Storage backend, overriding the config file.
    #[arg(long)]
    backend: Option<String>,

    /// Connection string, overriding the config file.
    /// For SQLite this is a file path (e.g. `admissions.db`) or `:memory:`.
    #[arg(long)]
    db: Option<String>,

    /// Fill and submit from a TOML answers file instead of prompting.
    #[arg(long)]
    answers: Option<PathBuf>,

    /// Log filter, overriding the config file.
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn app_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        if let Some(backend) = &self.backend {
            config.database.backend = backend.clone();
        }
        if let Some(db) = &self.db {
            config.database.connection_string = db.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(config)
    }

    fn session(&self) -> StaticSession {
        match (&self.user, &self.name) {
            (Some(user), Some(name)) => StaticSession::signed_in(user).with_display_name(name),
            (Some(user), None) => StaticSession::signed_in(user),
            _ => StaticSession::anonymous(),
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.app_config()?;

    logging::init_logging(&config.log_level)?;
    if let Some(path) = &config.log_file {
        logging::enable_file_logging(path)?;
    }
    debug!(?config, "configuration loaded");

    let mut form = open_form(&config, Arc::new(cli.session())).await?;

    match &cli.answers {
        Some(path) => {
            let answers = answers::load_answers(path)?;
            info!(count = answers.len(), "running scripted intake");
            let outcome = answers::run_scripted(&mut form, &answers, &mut io::stdout()).await?;
            Ok(match outcome {
                ScriptOutcome::Submitted => ExitCode::SUCCESS,
                ScriptOutcome::Rejected { step, .. } => {
                    eprintln!("application rejected at {step}");
                    ExitCode::FAILURE
                }
            })
        }
        None => {
            console::run(&mut form, io::stdin().lock(), io::stdout()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
