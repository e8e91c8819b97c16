//! Trivial building-block tasks.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use petrel_base::{StepResults, Task, TaskResult};
use serde_json::{Value, json};
use tracing::info;

use crate::error::ParameterError;
use crate::process::run_command;

/// Does nothing, successfully. Useful as a pipeline placeholder.
pub struct Dummy {
  name: String,
}

impl Dummy {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }
}

#[async_trait]
impl Task for Dummy {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    TaskResult::Success(Value::Bool(true))
  }
}

/// Sleeps for a fixed number of seconds and reports how long it slept.
pub struct Sleep {
  name: String,
  seconds: u64,
}

impl Sleep {
  pub fn new(name: impl Into<String>, seconds: u64) -> Self {
    Self {
      name: name.into(),
      seconds,
    }
  }
}

#[async_trait]
impl Task for Sleep {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    tokio::time::sleep(Duration::from_secs(self.seconds)).await;
    TaskResult::Success(json!(self.seconds))
  }
}

/// Sleeps until a target instant, or not at all if it is already past.
pub struct SleepUntil {
  name: String,
  target: DateTime<Utc>,
}

impl SleepUntil {
  pub fn new(name: impl Into<String>, target: DateTime<Utc>) -> Self {
    Self {
      name: name.into(),
      target,
    }
  }
}

#[async_trait]
impl Task for SleepUntil {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let remaining = self.target - Utc::now();
    match remaining.to_std() {
      Ok(duration) => {
        info!(target = %self.target, seconds = duration.as_secs_f64(), "sleeping until target");
        tokio::time::sleep(duration).await;
        TaskResult::Success(json!(duration.as_secs_f64()))
      }
      // Target in the past: nothing to wait for.
      Err(_) => TaskResult::Success(json!(0)),
    }
  }
}

/// Runs an arbitrary command on the node.
pub struct ShellCommand {
  name: String,
  command: Vec<String>,
}

impl ShellCommand {
  /// `command` is the program followed by its arguments.
  pub fn new(name: impl Into<String>, command: Vec<String>) -> Result<Self, ParameterError> {
    if command.is_empty() {
      return Err(ParameterError::EmptyCommand);
    }
    Ok(Self {
      name: name.into(),
      command,
    })
  }
}

#[async_trait]
impl Task for ShellCommand {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    run_command(&self.command[0], &self.command[1..]).await
  }
}
