//! Tracing installation.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING_INSTALLED: Once = Once::new();

/// Installs a formatted `tracing` subscriber (idempotent).
///
/// `RUST_LOG` takes precedence over `default_directive`, e.g. `"xframe=debug"`.
/// Does nothing if another global subscriber is already set.
pub fn init(default_directive: &str) {
    TRACING_INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
