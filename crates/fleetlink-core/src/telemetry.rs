//! Centralised tracing initialisation for Fleetlink binaries.
//!
//! The global subscriber IS the agent's local operational log: mirrored
//! audit lines, debug-level provisioning chatter and remote-failure
//! warnings all land here. Call [`init_logging`] once at program start.
//!
//! Safe to call more than once — subsequent calls are silently ignored
//! (the global subscriber can only be set once per process).

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the operational-log filter directives.
pub const LOG_FILTER_ENV: &str = "FLEETLINK_LOG";

/// Initialise the global tracing subscriber.
///
/// * `json` — when `true`, emit newline-delimited JSON log lines
///   (useful for log aggregation pipelines).
/// * `level` — default verbosity when `FLEETLINK_LOG` is not set.
///
/// Respects the `FLEETLINK_LOG` environment variable for fine-grained
/// per-target filtering.
pub fn init_logging(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}
