use anyhow::{Context, Result};
use clap::Parser;
use letter_generator::cli::{self, Cli};
use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    cli::run(cli).await
}

/// Structured JSON logs to a file when JOBMATCH_LOG_FILE is set, plain
/// logs to stderr otherwise.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("letter_generator=info,jobmatch=info,rocket::server=off"));

    match std::env::var("JOBMATCH_LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path))?;

            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(Arc::new(file))
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .init();
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }

    Ok(())
}
