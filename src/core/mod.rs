pub mod aggregator;
pub(crate) mod check_endpoints;
pub mod collection;
pub mod coordinator;
pub mod executor;
pub mod ramp_up;
pub mod session;
pub mod show_result_with_table;
