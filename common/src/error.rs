use thiserror::Error;

/// Rejected configuration values.
///
/// Only values that make a whole scan meaningless end up here. Individual
/// malformed seed addresses are skipped instead, see
/// [`crate::network::target::parse_seeds`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid port '{0}'")]
    InvalidPort(String),

    #[error("invalid port range '{0}': start must not exceed end")]
    InvalidPortRange(String),

    #[error("invalid timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),

    #[error("worker budget must be at least 1")]
    ZeroWorkers,

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}
