pub mod core;
pub mod models;

pub use crate::core::aggregator::{aggregate, aggregate_with_top_n, percentile};
pub use crate::core::coordinator::{run_test, run_test_with_cancel};
pub use crate::core::ramp_up::RampUpScheduler;
pub use crate::models::api_definition::{ApiDefinition, HttpMethod, RequestBody};
pub use crate::models::error::EngineError;
pub use crate::models::result::{RequestResult, TestSummary};
pub use crate::models::test_config::TestConfiguration;
pub use tokio_util::sync::CancellationToken;
