//! Logging setup for scene tooling
//!
//! The crate logs through the `log` facade: registry warnings at `warn`,
//! per-stream summaries at `debug` and per-entity finalize hooks at `trace`.
//! Binaries that embed the crate may install any logger; these helpers install
//! `env_logger` filtered by `RUST_LOG`.

pub use log::{debug, info, warn, error, trace};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "render_scene=info";

fn env() -> env_logger::Env<'static> {
    env_logger::Env::default().default_filter_or(DEFAULT_FILTER)
}

/// Install the logger
///
/// Panics if a logger is already installed, like `env_logger::init`.
pub fn init() {
    env_logger::Builder::from_env(env()).init();
}

/// Install a test-friendly logger, ignoring repeated initialization
pub fn try_init() {
    let _ = env_logger::Builder::from_env(env()).is_test(true).try_init();
}
