//! Shared fixtures for myst's integration tests.
//!
//! - [`builders`]: in-memory projects on a `MockFileSystem`, plus a settings
//!   builder.
//! - [`fake_backend`]: a scripted `RebuildBackend` for driving the watch loop.

pub mod builders;
pub mod fake_backend;

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

/// Checked before `RUST_LOG`, so test output can be tuned without touching
/// other tools that read `RUST_LOG`.
pub const TEST_LOG_ENV: &str = "MYST_TEST_LOG";

const DEFAULT_FILTER: &str = "warn,myst=debug,myst_test_utils=debug";

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Output is captured and only shown for failing tests (or with
/// `--nocapture`). myst's own `debug` lines, which carry skip and cache
/// decisions, are on by default.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = [TEST_LOG_ENV, EnvFilter::DEFAULT_ENV]
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .and_then(|raw| EnvFilter::try_new(raw).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

        // Another subscriber may already be installed by the harness.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
