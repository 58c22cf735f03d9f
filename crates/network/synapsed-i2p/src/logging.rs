//! Tracing subscriber setup for hosts that do not install their own.

use crate::config::RouterConfig;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(config: &RouterConfig) -> &'static str {
    if config.debug {
        "synapsed_i2p=debug"
    } else {
        "synapsed_i2p=info"
    }
}

/// Installs a global fmt subscriber. `RUST_LOG` takes precedence over the
/// config's debug flag. Returns `false` if a subscriber was already set.
pub fn init(config: &RouterConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .try_init()
        .is_ok()
}
