#![forbid(unsafe_code)]

//! Global `tracing` subscriber installation.
//!
//! The filter comes from `WEFT_LOG` (standard `EnvFilter` directives) and
//! falls back to the directive the caller passes, for example
//! `"weft=info,weft.tabs=debug"`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "WEFT_LOG";

fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install a human-readable subscriber. Returns `false` if a global
/// subscriber was already set.
pub fn init_logging(default_directive: &str) -> bool {
    tracing_subscriber::registry()
        .with(filter(default_directive))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

/// Install a JSON-lines subscriber. Returns `false` if a global subscriber
/// was already set.
pub fn init_json_logging(default_directive: &str) -> bool {
    tracing_subscriber::registry()
        .with(filter(default_directive))
        .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_failure() {
        let first = init_logging("warn");
        assert!(!init_json_logging("warn") || !first);
    }
}
