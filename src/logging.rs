//! Diagnostics go to stderr: stdout belongs to git while a filter runs.

use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LEVEL: &str = "warn";

/// Install the global subscriber. `RUST_LOG` wins over `level`.
///
/// Returns `false` if a subscriber was already installed.
pub fn init(level: Option<&str>) -> bool {
    let filter = build_filter(std::env::var("RUST_LOG").ok(), level);
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

fn build_filter(env: Option<String>, level: Option<&str>) -> EnvFilter {
    env.filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| level.and_then(|level| EnvFilter::try_new(level).ok()))
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL))
}
