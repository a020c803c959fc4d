//! Per-column value formatters.
//!
//! A formatter turns the raw textual value of one column into the text that
//! is substituted into a template. Columns without a registered formatter
//! pass their raw value through unchanged.

mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

pub use builtin::{CaseFormatter, DateFormatter, DecimalFormatter, TextCase};

/// A formatter rejected a raw value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Invalid value '{value}': {reason}")]
    InvalidValue { value: String, reason: String },

    #[error("Invalid format pattern '{0}'")]
    InvalidPattern(String),
}

impl FormatError {
    pub fn invalid(value: &str, reason: impl Into<String>) -> Self {
        FormatError::InvalidValue {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Transforms a raw column value before substitution.
///
/// Implementations are shared across render calls and must be safe to
/// invoke concurrently.
pub trait ValueFormatter: Send + Sync {
    fn format(&self, raw: &str) -> Result<String, FormatError>;
}

impl<F> ValueFormatter for F
where
    F: Fn(&str) -> Result<String, FormatError> + Send + Sync,
{
    fn format(&self, raw: &str) -> Result<String, FormatError> {
        self(raw)
    }
}

/// Column name to formatter mapping
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Arc<dyn ValueFormatter>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a formatter for a column, replacing any previous one
    pub fn register(
        mut self,
        column: impl Into<String>,
        formatter: impl ValueFormatter + 'static,
    ) -> Self {
        self.formatters.insert(column.into(), Arc::new(formatter));
        self
    }

    /// Register an already shared formatter
    pub fn register_shared(
        mut self,
        column: impl Into<String>,
        formatter: Arc<dyn ValueFormatter>,
    ) -> Self {
        self.formatters.insert(column.into(), formatter);
        self
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    /// Format a column value.
    ///
    /// NULL renders as the empty string and never reaches the formatter.
    pub fn format(&self, column: &str, raw: Option<&str>) -> Result<String, FormatError> {
        let Some(raw) = raw else {
            return Ok(String::new());
        };

        match self.formatters.get(column) {
            Some(formatter) => formatter.format(raw),
            None => Ok(raw.to_string()),
        }
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut columns: Vec<_> = self.formatters.keys().collect();
        columns.sort();
        f.debug_struct("FormatterRegistry")
            .field("columns", &columns)
            .finish()
    }
}
