use url::Url;

use crate::error::GatewayError;

/// Environment variable naming the experiment gateway endpoint.
pub const GATEWAY_ENDPOINT_VAR: &str = "PETREL_GATEWAY_ENDPOINT";
/// Environment variable naming the current experiment id.
pub const EXPERIMENT_ID_VAR: &str = "PETREL_EXPERIMENT_ID";

/// Where the experiment gateway lives and which experiment this node is
/// part of.
///
/// Passed explicitly into tasks at construction time; tasks never read the
/// process environment themselves. [`GatewayConfig::from_env`] exists for
/// deployments where the orchestrator injects these as environment
/// variables.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
  pub endpoint: Url,
  pub experiment_id: String,
}

impl GatewayConfig {
  pub fn new(endpoint: Url, experiment_id: impl Into<String>) -> Self {
    Self {
      endpoint,
      experiment_id: experiment_id.into(),
    }
  }

  pub fn from_env() -> Result<Self, GatewayError> {
    let endpoint = std::env::var(GATEWAY_ENDPOINT_VAR)
      .map_err(|_| GatewayError::MissingVariable(GATEWAY_ENDPOINT_VAR))?;
    let experiment_id = std::env::var(EXPERIMENT_ID_VAR)
      .map_err(|_| GatewayError::MissingVariable(EXPERIMENT_ID_VAR))?;

    let endpoint = Url::parse(&endpoint).map_err(|source| GatewayError::InvalidEndpoint {
      value: endpoint,
      source,
    })?;

    Ok(Self::new(endpoint, experiment_id))
  }

  /// URL of one experiment flag resource.
  pub(crate) fn flag_url(&self, flag_name: &str) -> String {
    format!(
      "{}/api/v1/experiment/{}/flag/{}",
      self.endpoint.as_str().trim_end_matches('/'),
      self.experiment_id,
      flag_name
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_flag_url_ignores_trailing_slash() {
    let config = GatewayConfig::new(Url::parse("http://gateway.local:8000/").unwrap(), "exp-1");
    assert_eq!(
      config.flag_url("ready"),
      "http://gateway.local:8000/api/v1/experiment/exp-1/flag/ready"
    );
  }
}
