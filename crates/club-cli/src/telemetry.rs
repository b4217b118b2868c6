use thiserror::Error as ThisError;
use tracing_subscriber::{filter::ParseError, EnvFilter};

#[derive(Debug, ThisError)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}'")]
    EnvFilter { value: String, source: ParseError },

    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Install the log subscriber. `RUST_LOG` takes precedence
/// over the configured level. Logs go to stderr.
pub fn init(log_level: &str) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|source| TelemetryError::EnvFilter {
            value: log_level.to_string(),
            source,
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_log_level() {
        std::env::remove_var("RUST_LOG");
        let err = init("club=loud").unwrap_err();
        assert!(matches!(err, TelemetryError::EnvFilter { .. }));
    }

    #[test]
    fn test_second_init_is_an_error() {
        std::env::remove_var("RUST_LOG");
        let _ = init("info");
        let err = init("info").unwrap_err();
        assert!(matches!(err, TelemetryError::Subscriber(_)));
    }
}
