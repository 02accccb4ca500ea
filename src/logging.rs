//! Tracing bootstrap shared by the library and the command-line binary.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV_VAR: &str = "PROMPT_FORGE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Installs the global stderr subscriber once. Later calls are no-ops.
///
/// Returns `false` when another subscriber was already installed by the host.
pub fn init_logging() -> bool {
    static INSTALLED: OnceLock<bool> = OnceLock::new();
    *INSTALLED.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false)
            .try_init()
            .is_ok()
    })
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
