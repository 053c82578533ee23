// Tracing setup for the CLI.
//
// Diagnostics go to stderr through a `tracing-subscriber` fmt layer. The
// filter comes from `RUST_LOG` and defaults to `warn`, so the progress bar
// is not buried under request logs.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Calling it twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .try_init();

    if result.is_err() {
        tracing::debug!("tracing subscriber already initialized");
    }
}
