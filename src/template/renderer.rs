//! Row-change renderer

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::event::{ChangeEvent, DmlType, LoadContext, RawValue};
use crate::format::FormatterRegistry;
use crate::gate::EventGate;

use super::substitution::{apply_markers, substitute_tokens};
use super::types::{RenderResult, TemplateSet};

/// Source of the value substituted for the `TIMESTAMP` marker
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Renders change events through the configured templates.
///
/// The renderer holds no per-call state and can be shared across threads
/// behind an `Arc`.
#[derive(Clone)]
pub struct TemplatedRenderer {
    templates: TemplateSet,
    formatters: FormatterRegistry,
    gate: Option<Arc<dyn EventGate>>,
    clock: Arc<dyn Clock>,
}

impl TemplatedRenderer {
    pub fn new(templates: TemplateSet) -> Self {
        Self::builder(templates).build()
    }

    pub fn builder(templates: TemplateSet) -> RendererBuilder {
        RendererBuilder {
            templates,
            formatters: FormatterRegistry::new(),
            gate: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Header template, unsubstituted
    pub fn render_header(&self, _ctx: &LoadContext) -> Option<String> {
        self.templates.header.clone()
    }

    /// Footer template, unsubstituted
    pub fn render_footer(&self, _ctx: &LoadContext) -> Option<String> {
        self.templates.footer.clone()
    }

    pub fn render_insert(
        &self,
        ctx: &LoadContext,
        values: &[RawValue],
    ) -> RenderResult<Option<String>> {
        let allowed = self
            .gate
            .as_ref()
            .map_or(true, |gate| gate.allow_insert(ctx, values));
        if !self.proceed(ctx, DmlType::Insert, allowed, self.templates.process_insert) {
            return Ok(None);
        }
        self.fill(ctx, DmlType::Insert, &ctx.column_names, values)
    }

    /// Only the row values are substituted; key values feed the gate.
    pub fn render_update(
        &self,
        ctx: &LoadContext,
        values: &[RawValue],
        keys: &[RawValue],
    ) -> RenderResult<Option<String>> {
        let allowed = self
            .gate
            .as_ref()
            .map_or(true, |gate| gate.allow_update(ctx, values, keys));
        if !self.proceed(ctx, DmlType::Update, allowed, self.templates.process_update) {
            return Ok(None);
        }
        self.fill(ctx, DmlType::Update, &ctx.column_names, values)
    }

    /// Deletes carry no row values, the key columns are substituted instead.
    pub fn render_delete(
        &self,
        ctx: &LoadContext,
        keys: &[RawValue],
    ) -> RenderResult<Option<String>> {
        let allowed = self
            .gate
            .as_ref()
            .map_or(true, |gate| gate.allow_delete(ctx, keys));
        if !self.proceed(ctx, DmlType::Delete, allowed, self.templates.process_delete) {
            return Ok(None);
        }
        self.fill(ctx, DmlType::Delete, &ctx.key_names, keys)
    }

    pub fn render(&self, ctx: &LoadContext, event: &ChangeEvent) -> RenderResult<Option<String>> {
        match event {
            ChangeEvent::Insert { values } => self.render_insert(ctx, values),
            ChangeEvent::Update { values, keys } => self.render_update(ctx, values, keys),
            ChangeEvent::Delete { keys } => self.render_delete(ctx, keys),
        }
    }

    fn proceed(&self, ctx: &LoadContext, kind: DmlType, allowed: bool, enabled: bool) -> bool {
        if !allowed {
            tracing::debug!(table = %ctx.table, kind = %kind, "Change vetoed by event gate");
            return false;
        }
        if !enabled {
            tracing::debug!(table = %ctx.table, kind = %kind, "Processing disabled for kind");
            return false;
        }
        true
    }

    fn fill(
        &self,
        ctx: &LoadContext,
        kind: DmlType,
        names: &[String],
        values: &[RawValue],
    ) -> RenderResult<Option<String>> {
        let Some(template) = self.templates.content.as_deref() else {
            return Ok(None);
        };

        let text = substitute_tokens(template, names, values, &self.formatters).inspect_err(
            |e| tracing::debug!(table = %ctx.table, kind = %kind, column = %e.column(), "Render failed"),
        )?;

        Ok(Some(apply_markers(&text, kind, self.clock.now_millis())))
    }
}

impl fmt::Debug for TemplatedRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplatedRenderer")
            .field("templates", &self.templates)
            .field("formatters", &self.formatters)
            .field("gate", &self.gate.is_some())
            .finish()
    }
}

/// Builder for [`TemplatedRenderer`]
pub struct RendererBuilder {
    templates: TemplateSet,
    formatters: FormatterRegistry,
    gate: Option<Arc<dyn EventGate>>,
    clock: Arc<dyn Clock>,
}

impl RendererBuilder {
    pub fn formatters(mut self, formatters: FormatterRegistry) -> Self {
        self.formatters = formatters;
        self
    }

    pub fn gate(mut self, gate: impl EventGate + 'static) -> Self {
        self.gate = Some(Arc::new(gate));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn build(self) -> TemplatedRenderer {
        TemplatedRenderer {
            templates: self.templates,
            formatters: self.formatters,
            gate: self.gate,
            clock: self.clock,
        }
    }
}
