//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// `default_filter` applies when `RUST_LOG` is unset. Returns `false` when a
/// logger was already installed (e.g. by the embedding application or an
/// earlier call), which is not an error.
pub fn init(default_filter: &str) -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        // Whichever call wins, the next one must report "already installed".
        let _ = init("debug");
        assert!(!init("info"));
    }
}
