//! # idremap
//!
//! Runs the rewriting pipeline against an in-memory host.
//!
//! Reads newline-delimited JSON dispatch actions from stdin, dispatches each
//! through the host bus, and writes every delivered action as a JSON line to
//! stdout. Logs go to stderr.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

use idremap::config::Settings;
use idremap::domain::ports::EventDispatcher;
use idremap::domain::DispatchAction;
use idremap::infrastructure::MemoryHost;
use idremap::startup::Application;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        idremap::telemetry::init_json_tracing();
    } else {
        idremap::telemetry::init_tracing();
    }

    let settings = Settings::load()?;
    info!(
        environment = %settings.environment,
        id_maps = settings.id_maps.len(),
        "Configuration loaded"
    );

    let host = Arc::new(MemoryHost::new());
    let mut events = host.dispatcher.subscribe();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        loop {
            match events.recv().await {
                Ok(action) => {
                    let mut line = serde_json::to_vec(&action)?;
                    line.push(b'\n');
                    stdout.write_all(&line).await?;
                    stdout.flush().await?;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Output fell behind; actions dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        anyhow::Ok(())
    });

    let application = Application::build(settings, host.clone());
    application.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut dispatched = 0usize;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<DispatchAction>(&line) {
            Ok(action) => {
                host.dispatcher.dispatch(action);
                dispatched += 1;
            }
            Err(e) => tracing::warn!(error = %e, "Skipping input line that is not a dispatch action"),
        }
        tokio::task::yield_now().await;
    }

    if let Some(report) = application.wait_for_auto_dispatch().await {
        info!(
            total = report.total(),
            delivered = report.delivered,
            failed = report.failed,
            skipped = report.skipped,
            "Auto-dispatch complete"
        );
    }

    application.stop();
    info!(dispatched, "Input exhausted; shutting down");

    // Dropping the last host handle closes the bus and ends the writer.
    drop(application);
    drop(host);
    writer.await??;

    Ok(())
}
