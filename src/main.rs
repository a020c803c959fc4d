use anyhow::Result;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

use templated_publisher::config::Settings;
use templated_publisher::error;
use templated_publisher::event::{ChangeEvent, ChangeRecord, LoadContext};
use templated_publisher::publish::compose_batch;
use templated_publisher::telemetry::init_tracing;
use templated_publisher::template::TemplatedRenderer;

/// Consecutive records sharing one context
struct PendingBatch {
    context: LoadContext,
    events: Vec<ChangeEvent>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_tracing(&settings.log)?;
    tracing::info!("Configuration loaded");

    let renderer = settings.build_renderer()?;
    tracing::info!(
        formatters = settings.formatters.len(),
        gated_tables = settings.gate.tables.len(),
        "Renderer initialized"
    );

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    let mut pending: Option<PendingBatch> = None;
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let record = match ChangeRecord::from_json(&line) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(line = line_no, error = %e, "Skipping malformed record");
                continue;
            }
        };

        match pending.as_mut() {
            Some(batch) if batch.context == record.context => batch.events.push(record.event),
            _ => {
                if let Some(batch) = pending.take() {
                    publish(&renderer, batch, &mut stdout).await?;
                }
                pending = Some(PendingBatch {
                    context: record.context,
                    events: vec![record.event],
                });
            }
        }
    }

    if let Some(batch) = pending.take() {
        publish(&renderer, batch, &mut stdout).await?;
    }

    stdout.flush().await?;
    tracing::info!(lines = line_no, "Input exhausted, shutdown complete");
    Ok(())
}

async fn publish(
    renderer: &TemplatedRenderer,
    batch: PendingBatch,
    out: &mut io::Stdout,
) -> error::Result<()> {
    let rendered = compose_batch(renderer, &batch.context, &batch.events);

    for failure in &rendered.failures {
        tracing::error!(
            table = %batch.context.table,
            index = failure.index,
            error = %failure.error,
            "Row dropped from batch"
        );
    }

    if let Some(text) = rendered.into_text() {
        out.write_all(text.as_bytes()).await?;
        out.write_all(b"\n").await?;
    }

    Ok(())
}
