// Shared components
pub mod config;
pub mod error;
pub mod telemetry;

// Rendering
pub mod event;
pub mod format;
pub mod gate;
pub mod template;

// Batch composition
pub mod publish;
