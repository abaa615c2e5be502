pub mod api; // Upload page and conversion endpoint
pub mod batch; // File-to-file conversion
pub mod config;
pub mod import; // CSV / workbook input, upload staging
pub mod pipeline; // Row classification and aggregation
pub mod report; // Five-sheet workbook output

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(json: bool, verbose: bool) {
    let fallback = if verbose {
        config::verbose_log_filter()
    } else {
        config::default_log_filter()
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(fmt::layer().json()).try_init().ok();
    } else {
        registry.with(fmt::layer()).try_init().ok();
    }
}
