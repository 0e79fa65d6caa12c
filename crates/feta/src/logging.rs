//! Test log output for mock lifecycle events.

use crate::config::FetaConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable read for the log filter
pub const LOG_ENV: &str = "FETA_LOG";

/// Install a fmt subscriber writing through the libtest capture.
///
/// The filter comes from `FETA_LOG`, falling back to `config.log_level`.
/// Returns `false` when a global subscriber was already installed.
pub fn init_logging(config: &FetaConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let config = FetaConfig::default().with_log_level("debug");
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
