mod settings;

pub use settings::{
    ColumnFormatterConfig, FormatterSpec, GateConfig, LogConfig, LogFormat, Settings,
};
