//! Log output for binaries and examples built on nanomask.
//!
//! The library crates only emit through the `log` facade (and `tracing`
//! spans with the `tracing` feature); nothing is printed until one of these
//! initialisers installs a backend.

use log::{LevelFilter, SetLoggerError};

/// Install an `env_logger` backend writing to stderr.
///
/// `level` is the default filter; `RUST_LOG` directives override it. Fails
/// when a logger is already installed for the process.
pub fn init_logging(level: LevelFilter) -> Result<(), SetLoggerError> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init()
}

/// Install a `tracing` subscriber and route `log` records into it.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. A second call leaves
/// the first subscriber in place.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = if json {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).compact().try_init()
    };
    if installed.is_err() {
        return;
    }
    // No-op when the subscriber already installed a log bridge.
    let _ = tracing_log::LogTracer::init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_logger_is_refused() {
        let _ = init_logging(LevelFilter::Debug);
        log::debug!("calibration log line");
        assert!(init_logging(LevelFilter::Trace).is_err());
    }
}
