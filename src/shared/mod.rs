/// Shared utilities and types used across all layers
///
/// This module contains:
/// - Protocol definitions (sides, lifecycle events)
/// - Error types
/// - Book configuration
/// - Prometheus metrics

pub mod protocol;
pub mod error;
pub mod config;
pub mod metrics;

// Re-export commonly used types
pub use protocol::{BookEvent, Side};
pub use error::{BookError, ConfigError};
pub use config::BookConfig;
