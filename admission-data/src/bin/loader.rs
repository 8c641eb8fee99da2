use std::fs::File;
use std::path::PathBuf;

use admission_core::{ApplicationRepository, ValidationPolicy, Validator};
use admission_data::ApplicationCsv;
use admission_db_sqlite::SqliteApplicationRepository;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Bulk import and export of school applications.
///
/// Import files need a `user_id` column plus any form field columns
/// (snake_case or camelCase). Every row is validated against all four form
/// steps; rows that fail are reported and skipped.
#[derive(Parser, Debug)]
#[command(name = "admission-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database URL (e.g. sqlite:admissions.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:admissions.db?mode=rwc")]
    database: String,

    /// Run database migrations first
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load applications from a CSV file
    Import {
        /// Path to the CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Validation applied to each row
        #[arg(long, value_enum, default_value_t = Policy::Lenient)]
        policy: Policy,
    },
    /// Write every stored application to a CSV file
    Export {
        /// Destination path
        #[arg(short, long)]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    Lenient,
    Strict,
}

impl From<Policy> for ValidationPolicy {
    fn from(p: Policy) -> Self {
        match p {
            Policy::Lenient => ValidationPolicy::Lenient,
            Policy::Strict => ValidationPolicy::Strict,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .without_time()
        .with_target(false)
        .init();

    let args = Args::parse();

    let repo = SqliteApplicationRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    match args.command {
        Command::Import { file, policy } => {
            println!("Loading applications from: {}", file.display());

            let reader =
                File::open(&file).with_context(|| format!("Failed to open: {}", file.display()))?;
            let rows = ApplicationCsv::parse(reader)
                .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;
            println!("Parsed {} rows from CSV", rows.len());

            let report = ApplicationCsv::load(&repo, &rows, &Validator::new(policy.into()))
                .await
                .context("Failed to load applications into database")?;

            for rejected in &report.rejected {
                println!(
                    "  line {} ({}): {}",
                    rejected.line, rejected.user_id, rejected.errors
                );
            }
            println!(
                "Imported {} application(s); rejected {}.",
                report.imported,
                report.rejected.len()
            );
        }
        Command::Export { out } => {
            let records = repo
                .list_applications()
                .await
                .context("Failed to read applications")?;
            let writer =
                File::create(&out).with_context(|| format!("Failed to create: {}", out.display()))?;
            let written = ApplicationCsv::export(&records, writer)
                .with_context(|| format!("Failed to write CSV: {}", out.display()))?;
            println!("Exported {} application(s) to {}", written, out.display());
        }
    }

    Ok(())
}
