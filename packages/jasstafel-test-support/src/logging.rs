//! Logging for test binaries, unit and integration alike.
//!
//! The level comes from `TEST_LOG`, then `RUST_LOG`, else `warn`. Output goes
//! through the test writer so cargo captures it per test.

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

const QUIET: &str = "warn";

static INSTALLED: Lazy<bool> = Lazy::new(|| {
    fmt()
        .with_env_filter(filter())
        .with_test_writer()
        .without_time()
        .try_init()
        .is_ok()
});

fn filter() -> EnvFilter {
    ["TEST_LOG", "RUST_LOG"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok())
        .map_or_else(|| EnvFilter::new(QUIET), EnvFilter::new)
}

/// Install the subscriber at most once per binary. Returns false when some
/// other subscriber got there first.
pub fn init() -> bool {
    *INSTALLED
}
