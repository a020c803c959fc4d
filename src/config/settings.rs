use std::collections::HashSet;
use std::env;
use std::sync::Arc;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::format::{
    CaseFormatter, DateFormatter, DecimalFormatter, FormatError, FormatterRegistry, TextCase,
    ValueFormatter,
};
use crate::gate::TableGate;
use crate::template::{TemplateSet, TemplatedRenderer};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub templates: TemplateSet,
    #[serde(default)]
    pub formatters: Vec<ColumnFormatterConfig>,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Formatter bound to one column.
///
/// Kept as a list rather than a map so column names stay case-exact.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnFormatterConfig {
    pub column: String,
    pub format: FormatterSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FormatterSpec {
    Date {
        input: String,
        output: String,
    },
    Decimal {
        #[serde(default = "default_scale")]
        scale: usize,
        #[serde(default)]
        prefix: String,
        #[serde(default)]
        suffix: String,
    },
    Upper,
    Lower,
    Trim,
}

const MAX_SCALE: usize = 18;

fn default_scale() -> usize {
    2
}

impl FormatterSpec {
    pub fn build(&self) -> std::result::Result<Arc<dyn ValueFormatter>, FormatError> {
        let formatter: Arc<dyn ValueFormatter> = match self {
            FormatterSpec::Date { input, output } => {
                Arc::new(DateFormatter::new(input.as_str(), output.as_str())?)
            }
            FormatterSpec::Decimal {
                scale,
                prefix,
                suffix,
            } => Arc::new(
                DecimalFormatter::new(*scale)
                    .with_prefix(prefix.as_str())
                    .with_suffix(suffix.as_str()),
            ),
            FormatterSpec::Upper => Arc::new(CaseFormatter::new(TextCase::Upper)),
            FormatterSpec::Lower => Arc::new(CaseFormatter::new(TextCase::Lower)),
            FormatterSpec::Trim => Arc::new(CaseFormatter::new(TextCase::Trim)),
        };
        Ok(formatter)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GateConfig {
    /// Tables allowed through; empty allows every table
    #[serde(default)]
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("log.level", "info")?
            .set_default("log.format", "pretty")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // PUBLISHER__TEMPLATES__CONTENT, PUBLISHER__GATE__TABLES, etc.
            .add_source(
                Environment::with_prefix("PUBLISHER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("gate.tables"),
            );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Parse settings from a TOML document
    pub fn from_toml(source: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.formatters {
            if !seen.insert(entry.column.as_str()) {
                return Err(AppError::Validation(format!(
                    "Formatter configured twice for column {}",
                    entry.column
                )));
            }
            if let FormatterSpec::Decimal { scale, .. } = entry.format {
                if scale > MAX_SCALE {
                    return Err(AppError::Validation(format!(
                        "Decimal scale for column {} must be at most {}",
                        entry.column, MAX_SCALE
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn formatter_registry(&self) -> Result<FormatterRegistry> {
        self.validate()?;

        self.formatters
            .iter()
            .try_fold(FormatterRegistry::new(), |registry, entry| {
                let formatter = entry.format.build().map_err(|e| {
                    AppError::Validation(format!("Formatter for column {}: {}", entry.column, e))
                })?;
                Ok(registry.register_shared(entry.column.clone(), formatter))
            })
    }

    pub fn build_renderer(&self) -> Result<TemplatedRenderer> {
        let mut builder = TemplatedRenderer::builder(self.templates.clone())
            .formatters(self.formatter_registry()?);

        if !self.gate.tables.is_empty() {
            builder = builder.gate(TableGate::new(self.gate.tables.iter().cloned()));
        }

        Ok(builder.build())
    }
}
