//! Tower middleware layers for handler-side action pipelines.
//!
//! - [`load_shed`]: Semaphore-based concurrency limiting
//! - [`validate`]: Request validation before any work is done
//! - [`timeout`]: Per-call timeout enforcement
//! - [`metrics`]: Call timing and counting via `tracing` spans and `metrics`
//! - [`pipeline`]: Composes all layers into a single service stack

pub mod load_shed;
pub mod metrics;
pub mod pipeline;
pub mod timeout;
pub mod validate;

pub use load_shed::LoadShedLayer;
pub use metrics::MetricsLayer;
pub use pipeline::{build_action_pipeline, pipeline_handler};
pub use timeout::TimeoutLayer;
pub use validate::ValidateLayer;
