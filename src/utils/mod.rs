//! # Utility Modules
//!
//! Supporting utilities for logging and observability.
//!
//! ## Components
//! - **Logging**: tracing-subscriber setup driven by `LoggingConfig`
//! - **Metrics**: thread-safe exchange counters

pub mod logging;
pub mod metrics;

pub use logging::{app_span, init_logging};
pub use metrics::{Metrics, MetricsSnapshot};
