//! Template configuration and error definitions

use serde::Deserialize;
use thiserror::Error;

use crate::format::FormatError;

/// Render-specific error type
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Formatting column {column} failed: {source}")]
    Format { column: String, source: FormatError },
}

impl RenderError {
    /// Column whose value could not be rendered
    pub fn column(&self) -> &str {
        match self {
            RenderError::Format { column, .. } => column,
        }
    }
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Templates and per-kind switches, fixed once the renderer is built
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateSet {
    /// Text emitted before the rows of a batch, returned verbatim
    #[serde(default)]
    pub header: Option<String>,

    /// Text emitted after the rows of a batch, returned verbatim
    #[serde(default)]
    pub footer: Option<String>,

    /// Per-row template with %COLUMN% tokens and DMLTYPE/TIMESTAMP markers
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default = "default_true")]
    pub process_insert: bool,

    #[serde(default = "default_true")]
    pub process_update: bool,

    #[serde(default = "default_true")]
    pub process_delete: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            header: None,
            footer: None,
            content: None,
            process_insert: default_true(),
            process_update: default_true(),
            process_delete: default_true(),
        }
    }
}

impl TemplateSet {
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_processes_all_kinds() {
        let set = TemplateSet::default();
        assert!(set.process_insert && set.process_update && set.process_delete);
        assert!(set.content.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let set: TemplateSet =
            serde_json::from_str(r#"{"content":"%ID%","process_delete":false}"#).unwrap();
        assert_eq!(set.content.as_deref(), Some("%ID%"));
        assert!(set.process_insert);
        assert!(!set.process_delete);
        assert!(set.header.is_none());
    }
}
