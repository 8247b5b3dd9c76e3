//! Observability infrastructure for the Meta Business client.
//!
//! Provides tracing spans, metrics, and log redaction utilities.

pub mod logging;
pub mod metrics;
pub mod tracing_utils;

pub use logging::*;
pub use metrics::*;
pub use tracing_utils::*;
