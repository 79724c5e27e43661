#[path = "mailverify-cli/args.rs"]
mod args;
#[path = "mailverify-cli/output.rs"]
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use mailverify_lib::{Verifier, parse_address};
use tracing::warn;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Cli, Commands, EngineArgs};
use crate::output::OutputRow;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mailverify_lib=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn verify_all(emails: &[String], engine: &EngineArgs) -> Result<Vec<OutputRow>> {
    let config = engine.config();
    let request_timeout = config.request_timeout;
    let verifier = Verifier::new(config).context("building verifier")?;
    if !engine.extra_disposable.is_empty() {
        verifier.add_disposable_domains(&engine.extra_disposable);
    }
    if engine.auto_update_disposable {
        wait_ready(&verifier, request_timeout).await;
    }

    let mut rows = Vec::with_capacity(emails.len());
    for email in emails {
        let row = match verifier.verify(email).await {
            Ok(result) => OutputRow::from_result(&result),
            Err(err) if err.is_invalid_address() => OutputRow::from_address(&parse_address(email)),
            Err(err) => OutputRow::from_error(email, &err),
        };
        rows.push(row);
    }
    Ok(rows)
}

// premier chargement de la liste distante, sans bloquer indéfiniment
async fn wait_ready(verifier: &Verifier, limit: Duration) {
    let poll = async {
        while !verifier.is_ready() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    };
    if tokio::time::timeout(limit, poll).await.is_err() {
        warn!("disposable list not loaded yet, using the built-in list");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let emails = cli.inputs()?;

    let rows: Vec<OutputRow> = match &cli.cmd {
        Commands::Parse { .. } => emails
            .iter()
            .map(|email| OutputRow::from_address(&parse_address(email)))
            .collect(),
        Commands::Verify { engine, .. } => verify_all(&emails, engine).await?,
    };

    output::write_reports(&rows, &cli)?;

    // codes de sortie : 0 OK, 2 invalids, 1 fatal
    if output::any_invalid(&rows) {
        std::process::exit(2);
    }
    Ok(())
}
