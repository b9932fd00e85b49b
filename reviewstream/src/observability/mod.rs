//! Observability utilities.

mod logging;
mod metrics;

pub use logging::{init_tracing, SpanTimer};
pub use metrics::{record_stage, StageMetrics};
