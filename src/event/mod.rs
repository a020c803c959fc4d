//! Row-level change events and the per-table context they arrive with.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of data manipulation a change event carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmlType {
    Insert,
    Update,
    Delete,
}

impl DmlType {
    /// Name substituted for the `DMLTYPE` marker
    pub fn as_str(&self) -> &'static str {
        match self {
            DmlType::Insert => "INSERT",
            DmlType::Update => "UPDATE",
            DmlType::Delete => "DELETE",
        }
    }
}

impl fmt::Display for DmlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table metadata shared by every change event of a batch.
///
/// `column_names` is parallel to the values of inserts and updates,
/// `key_names` is parallel to the primary key values of updates and deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadContext {
    /// Source table name
    #[serde(default)]
    pub table: String,

    /// Ordered column names
    #[serde(default)]
    pub column_names: Vec<String>,

    /// Ordered primary key column names
    #[serde(default)]
    pub key_names: Vec<String>,
}

impl LoadContext {
    /// Create a context for the given table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Set the column names
    pub fn with_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the primary key column names
    pub fn with_keys<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_names = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Raw textual column value, `None` for SQL NULL
pub type RawValue = Option<String>;

/// A single row change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChangeEvent {
    Insert {
        values: Vec<RawValue>,
    },
    Update {
        values: Vec<RawValue>,
        #[serde(default)]
        keys: Vec<RawValue>,
    },
    Delete {
        keys: Vec<RawValue>,
    },
}

impl ChangeEvent {
    pub fn kind(&self) -> DmlType {
        match self {
            ChangeEvent::Insert { .. } => DmlType::Insert,
            ChangeEvent::Update { .. } => DmlType::Update,
            ChangeEvent::Delete { .. } => DmlType::Delete,
        }
    }
}

/// A change event together with the context it was captured in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub context: LoadContext,
    pub event: ChangeEvent,
}

impl ChangeRecord {
    /// Parse one line of JSON input
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}
