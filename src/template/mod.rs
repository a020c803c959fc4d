//! Change event template system.
//!
//! This module provides:
//! - Template configuration with `%COLUMN%` placeholders
//! - Token substitution engine with per-column formatting
//! - The renderer that gates and renders insert, update and delete events
//!
//! # Example
//!
//! ```ignore
//! let templates = TemplateSet::with_content("%DMLTYPE% order %ID%: %AMOUNT%");
//! let renderer = TemplatedRenderer::builder(templates)
//!     .formatters(
//!         FormatterRegistry::new()
//!             .register("AMOUNT", DecimalFormatter::new(2).with_prefix("$")),
//!     )
//!     .build();
//!
//! let ctx = LoadContext::new("orders").with_columns(["ID", "AMOUNT"]);
//! let rendered = renderer.render_insert(&ctx, &[Some("7".into()), Some("100".into())])?;
//! assert_eq!(rendered.as_deref(), Some("INSERT order 7: $100.00"));
//! ```

mod renderer;
mod substitution;
mod types;

pub use renderer::{Clock, FixedClock, RendererBuilder, SystemClock, TemplatedRenderer};
pub use substitution::{apply_markers, substitute_tokens, DML_TYPE_MARKER, TIMESTAMP_MARKER};
pub use types::{RenderError, RenderResult, TemplateSet};
