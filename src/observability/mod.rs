//! Observability
//!
//! - Structured logging through `tracing`, one record per event
//! - Lock-free counters for pushdown decisions
//!
//! Library code only emits records. Installing a subscriber is left to the
//! binary (see [`init_logging`]).

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{MetricsRegistry, MetricsSnapshot};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "DOCPROXY_LOG";

/// Default filter when `DOCPROXY_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Installs a JSON tracing subscriber on stderr.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
