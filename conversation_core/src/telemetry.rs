//! Log output for binaries embedding the conversation core.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,npc_registry=info,conversation_core=debug";

/// Install a formatted tracing subscriber.
///
/// `RUST_LOG` overrides `default_filter`. Installing twice is a no-op.
pub fn init(default_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(true)
        .try_init();
}
