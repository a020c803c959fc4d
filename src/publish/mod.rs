//! Batch composition: header, rendered rows, footer.
//!
//! Rows whose formatting fails are recorded and skipped. Header and footer
//! never depend on row outcomes.

use crate::event::{ChangeEvent, LoadContext};
use crate::template::{RenderError, TemplatedRenderer};

/// A row that could not be rendered
#[derive(Debug)]
pub struct RowFailure {
    /// Position of the event within the batch
    pub index: usize,
    pub error: RenderError,
}

/// Rendered text of one batch of change events
#[derive(Debug, Default)]
pub struct RenderedBatch {
    pub header: Option<String>,
    pub rows: Vec<String>,
    pub footer: Option<String>,
    pub failures: Vec<RowFailure>,
}

impl RenderedBatch {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header, rows and footer concatenated.
    ///
    /// Returns `None` when no row was rendered, so a batch made only of
    /// suppressed or failed rows publishes nothing.
    pub fn into_text(self) -> Option<String> {
        if self.rows.is_empty() {
            return None;
        }

        let mut text = self.header.unwrap_or_default();
        for row in &self.rows {
            text.push_str(row);
        }
        if let Some(footer) = self.footer {
            text.push_str(&footer);
        }
        Some(text)
    }
}

/// Render every event of a batch sharing one context
pub fn compose_batch<'a, I>(
    renderer: &TemplatedRenderer,
    ctx: &LoadContext,
    events: I,
) -> RenderedBatch
where
    I: IntoIterator<Item = &'a ChangeEvent>,
{
    let mut batch = RenderedBatch {
        header: renderer.render_header(ctx),
        footer: renderer.render_footer(ctx),
        ..RenderedBatch::default()
    };

    for (index, event) in events.into_iter().enumerate() {
        match renderer.render(ctx, event) {
            Ok(Some(row)) => batch.rows.push(row),
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(
                    table = %ctx.table,
                    index,
                    error = %error,
                    "Skipping row that failed to render"
                );
                batch.failures.push(RowFailure { index, error });
            }
        }
    }

    tracing::debug!(
        table = %ctx.table,
        rows = batch.rows.len(),
        failures = batch.failures.len(),
        "Batch composed"
    );

    batch
}
