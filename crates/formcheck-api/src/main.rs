//! FormCheck CLI entry point.

use anyhow::Context;
use clap::Parser;
use formcheck_core::Landmark;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use formcheck_api::{cli, Cli, Commands, FormCheckConfig, FormService};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => FormCheckConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => FormCheckConfig::from_env().context("failed to load configuration")?,
    };
    let service = FormService::from_config(&config)?;

    match args.command {
        Commands::Watch { exercise } => {
            let mut session = service.new_session();
            if let Some(exercise) = exercise {
                session.set_exercise(&exercise);
            }
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let summary = cli::watch(&service, &mut session, stdin.lock(), stdout.lock())?;
            tracing::info!(
                "Feed ended: {} frames processed, {} skipped",
                summary.frames,
                summary.skipped
            );
        }
        Commands::Classify { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let landmarks: Vec<Landmark> = serde_json::from_str(&json)
                .with_context(|| format!("{} is not a landmark array", path.display()))?;
            let response = service.classify(&landmarks)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Instructions { exercise } => {
            let instructions = service.instructions(&exercise)?;
            println!("{}", serde_json::to_string_pretty(instructions)?);
        }
    }

    Ok(())
}
