pub mod api_definition;
pub mod args;
pub mod error;
pub mod http_error_stats;
pub mod result;
pub mod test_config;
