//! Experiment-coordination flags.
//!
//! Flags are small named values hosted by the experiment gateway that let
//! tasks on different nodes coordinate (readiness signals, shared
//! counters). All four tasks talk to
//! `{gateway}/api/v1/experiment/{id}/flag/{name}`.

use async_trait::async_trait;
use petrel_base::{StepResults, Task, TaskResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParameterError;
use crate::gateway::GatewayConfig;

/// Value of one experiment flag. At least one field must be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagValues {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub int_value: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub text_value: Option<String>,
}

/// Sets a flag to the given values.
pub struct SetFlag {
  name: String,
  flag_name: String,
  values: FlagValues,
  gateway: GatewayConfig,
  client: reqwest::Client,
}

impl SetFlag {
  pub fn new(
    name: impl Into<String>,
    flag_name: impl Into<String>,
    values: FlagValues,
    gateway: GatewayConfig,
  ) -> Result<Self, ParameterError> {
    if values.int_value.is_none() && values.text_value.is_none() {
      return Err(ParameterError::EmptyFlagValues);
    }
    Ok(Self {
      name: name.into(),
      flag_name: flag_name.into(),
      values,
      gateway,
      client: reqwest::Client::new(),
    })
  }
}

#[async_trait]
impl Task for SetFlag {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let url = self.gateway.flag_url(&self.flag_name);
    let response = match self.client.post(&url).json(&self.values).send().await {
      Ok(response) => response,
      Err(e) => return TaskResult::Failure(format!("failed to set flag '{}': {e}", self.flag_name)),
    };

    let status = response.status();
    if status.is_success() {
      TaskResult::Success(Value::Null)
    } else {
      let body = response.text().await.unwrap_or_default();
      TaskResult::Failure(format!(
        "failed to set flag '{}': {status} {body}",
        self.flag_name
      ))
    }
  }
}

/// Reads a flag's current values.
pub struct GetFlag {
  name: String,
  flag_name: String,
  gateway: GatewayConfig,
  client: reqwest::Client,
}

impl GetFlag {
  pub fn new(
    name: impl Into<String>,
    flag_name: impl Into<String>,
    gateway: GatewayConfig,
  ) -> Self {
    Self {
      name: name.into(),
      flag_name: flag_name.into(),
      gateway,
      client: reqwest::Client::new(),
    }
  }
}

#[async_trait]
impl Task for GetFlag {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let url = self.gateway.flag_url(&self.flag_name);
    let response = match self.client.get(&url).send().await {
      Ok(response) => response,
      Err(e) => return TaskResult::Failure(format!("failed to get flag '{}': {e}", self.flag_name)),
    };

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return TaskResult::Failure(format!(
        "failed to get flag '{}': {status} {body}",
        self.flag_name
      ));
    }

    match response.json::<FlagValues>().await {
      Ok(values) => TaskResult::success(values),
      Err(e) => TaskResult::Failure(format!("invalid flag payload for '{}': {e}", self.flag_name)),
    }
  }
}

/// Server-side atomic update applied to a flag's integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOperation {
  Increment,
  Decrement,
}

impl FlagOperation {
  fn as_str(&self) -> &'static str {
    match self {
      FlagOperation::Increment => "increment",
      FlagOperation::Decrement => "decrement",
    }
  }
}

/// Applies an atomic increment or decrement to a flag.
pub struct AtomicFlagUpdate {
  name: String,
  flag_name: String,
  operation: FlagOperation,
  gateway: GatewayConfig,
  client: reqwest::Client,
}

impl AtomicFlagUpdate {
  pub fn new(
    name: impl Into<String>,
    flag_name: impl Into<String>,
    operation: FlagOperation,
    gateway: GatewayConfig,
  ) -> Self {
    Self {
      name: name.into(),
      flag_name: flag_name.into(),
      operation,
      gateway,
      client: reqwest::Client::new(),
    }
  }
}

/// Convenience constructor for an atomic increment.
pub fn atomic_increment_flag(
  name: impl Into<String>,
  flag_name: impl Into<String>,
  gateway: GatewayConfig,
) -> AtomicFlagUpdate {
  AtomicFlagUpdate::new(name, flag_name, FlagOperation::Increment, gateway)
}

/// Convenience constructor for an atomic decrement.
pub fn atomic_decrement_flag(
  name: impl Into<String>,
  flag_name: impl Into<String>,
  gateway: GatewayConfig,
) -> AtomicFlagUpdate {
  AtomicFlagUpdate::new(name, flag_name, FlagOperation::Decrement, gateway)
}

#[async_trait]
impl Task for AtomicFlagUpdate {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let url = format!(
      "{}/{}",
      self.gateway.flag_url(&self.flag_name),
      self.operation.as_str()
    );
    let response = match self.client.post(&url).send().await {
      Ok(response) => response,
      Err(e) => {
        return TaskResult::Failure(format!(
          "failed to {} flag '{}': {e}",
          self.operation.as_str(),
          self.flag_name
        ));
      }
    };

    let status = response.status();
    if status.is_success() {
      TaskResult::Success(Value::Null)
    } else {
      let body = response.text().await.unwrap_or_default();
      TaskResult::Failure(format!(
        "failed to {} flag '{}': {status} {body}",
        self.operation.as_str(),
        self.flag_name
      ))
    }
  }
}
