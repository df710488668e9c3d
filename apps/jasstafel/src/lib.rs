#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod extractors;
pub mod infra;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod trace_ctx;

// Re-exports for public API
pub use config::ServerConfig;
pub use error::AppError;
pub use errors::domain::DomainError;
pub use errors::ErrorCode;
pub use extractors::session_id::SessionId;
pub use extractors::validated_json::ValidatedJson;
pub use infra::state::build_state;
pub use middleware::request_trace::RequestTrace;
pub use middleware::trace_span::TraceSpan;
pub use services::sessions::SessionService;
pub use services::sync::{GameStore, InMemoryGameStore};
pub use state::app_state::AppState;

// Unit tests share the integration test logger
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    jasstafel_test_support::logging::init();
}
