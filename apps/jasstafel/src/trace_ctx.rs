//! Task-local trace context for web requests.
//!
//! Holds the current request's trace id so error responses and logs deep in
//! the handler stack can reference it without threading it through calls.

use std::future::Future;

use tokio::task_local;

/// Reported when no request scope is active.
pub const UNKNOWN: &str = "unknown";

task_local! {
    static TRACE_ID: String;
}

/// Trace id of the request being served, or [`UNKNOWN`].
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(String::clone)
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

/// Run `future` with `trace_id` as the current request's trace id.
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}
