//! Recap CLI entry point.

use clap::Parser;
use recap::cli::{commands, exit_status, Cli, Commands, Output};
use recap::config::Settings;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; keys may already be exported.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(PathBuf::from);
    let settings = match Settings::load_from(config_path.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            Output::error(&e.to_string());
            return ExitCode::from(2);
        }
    };

    // Without -v the configured level applies.
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("recap={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(&cli, settings, config_path).await {
        Ok(code) => code,
        Err(e) => {
            Output::error(&format!("{:#}", e));
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn run(cli: &Cli, settings: Settings, config_path: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Commands::Doctor => {
            if !commands::run_doctor(&settings, config_path.as_ref())? {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::List => {
            commands::run_list(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, &settings, config_path.as_ref())?;
        }

        command => {
            if let Some((mode, reference, max_videos, args)) = command.summarize_parts() {
                // Individual video failures are in the report and do not change the exit code.
                commands::run_summarize(mode, reference, max_videos, args, settings).await?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
