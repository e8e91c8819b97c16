//! iperf3 throughput testing.
//!
//! The server runs in the background and records its pid; the stop task
//! retrieves the pid through the step result store, or falls back to
//! `killall` when no producing step is named.

use async_trait::async_trait;
use petrel_base::{StepResults, Task, TaskResult};

use crate::error::ParameterError;
use crate::process::{run_command, spawn_background};

const IPERF3_REQUIREMENT: &str = "apt-get install -y iperf3";

/// Starts an iperf3 server. A `-s` flag is ensured.
pub struct Iperf3ServerStart {
  name: String,
  flags: Vec<String>,
}

impl Iperf3ServerStart {
  pub fn new(name: impl Into<String>, mut flags: Vec<String>) -> Self {
    if !flags.iter().any(|flag| flag == "-s") {
      flags.push("-s".to_string());
    }
    Self {
      name: name.into(),
      flags,
    }
  }
}

#[async_trait]
impl Task for Iperf3ServerStart {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    vec![IPERF3_REQUIREMENT.to_string()]
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    spawn_background("iperf3", &self.flags).await
  }
}

/// Stops an iperf3 server, by recorded pid when a start-task name is
/// given, otherwise by `killall`.
pub struct Iperf3ServerStop {
  name: String,
  server_start_task_name: Option<String>,
}

impl Iperf3ServerStop {
  pub fn new(name: impl Into<String>, server_start_task_name: Option<String>) -> Self {
    Self {
      name: name.into(),
      server_start_task_name,
    }
  }
}

#[async_trait]
impl Task for Iperf3ServerStop {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    vec![
      "apt-get install -y procps".to_string(),
      "apt-get install -y psmisc".to_string(),
    ]
  }

  async fn run(&self, steps: &StepResults) -> TaskResult {
    let Some(start_task_name) = &self.server_start_task_name else {
      return run_command("killall", &["iperf3".to_string()]).await;
    };

    let recorded = steps.latest(start_task_name);
    if recorded.is_failure() {
      return recorded;
    }

    let payload = recorded.unwrap();
    let Some(pid) = payload.as_u64() else {
      return TaskResult::Failure(format!(
        "step '{start_task_name}' did not record a process id: {payload}"
      ));
    };

    run_command("kill", &[pid.to_string()]).await
  }
}

/// Runs an iperf3 client; the flags must carry a `-c <server>`.
pub struct Iperf3Client {
  name: String,
  flags: Vec<String>,
}

impl Iperf3Client {
  pub fn new(name: impl Into<String>, flags: Vec<String>) -> Result<Self, ParameterError> {
    if !flags.iter().any(|flag| flag.starts_with("-c")) {
      return Err(ParameterError::MissingServerFlag);
    }
    Ok(Self {
      name: name.into(),
      flags,
    })
  }
}

#[async_trait]
impl Task for Iperf3Client {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    vec![IPERF3_REQUIREMENT.to_string()]
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    run_command("iperf3", &self.flags).await
  }
}
