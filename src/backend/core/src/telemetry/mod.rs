//! Telemetry: structured logging.
//!
//! Denied permission checks are additionally counted through the `metrics`
//! facade (`bufete_access_denied_total`); installing an exporter is left to
//! the host application.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingConfig, SpanEventConfig};
