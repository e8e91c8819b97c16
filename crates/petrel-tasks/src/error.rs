use thiserror::Error;

/// Construction-time parameter errors.
///
/// Task parameters are validated eagerly so that a bad pipeline definition
/// fails before any node is contacted.
#[derive(Debug, Error)]
pub enum ParameterError {
  #[error("shell command must not be empty")]
  EmptyCommand,

  #[error("iperf3 client flags must include '-c <server>'")]
  MissingServerFlag,

  #[error("either int_value or text_value must be set")]
  EmptyFlagValues,
}

/// Errors building a [`crate::GatewayConfig`].
#[derive(Debug, Error)]
pub enum GatewayError {
  #[error("environment variable {0} is not set")]
  MissingVariable(&'static str),

  #[error("invalid gateway endpoint '{value}': {source}")]
  InvalidEndpoint {
    value: String,
    #[source]
    source: url::ParseError,
  },
}
