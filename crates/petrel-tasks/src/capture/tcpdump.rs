//! tcpdump-based capture.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use petrel_base::{Dispatcher, StepResults, Task, TaskResult};

use crate::process::{run_command, spawn_background};

fn capture_requirements() -> Vec<String> {
  vec![
    "sudo apt-get update".to_string(),
    "sudo apt-get install -y tcpdump".to_string(),
  ]
}

/// Start a tcpdump capture writing to `filepath`.
///
/// The recorded payload is the tcpdump process id; schedule a
/// [`stop_named_capture`] later in the pipeline to terminate it.
pub fn start_capture(
  name: impl Into<String>,
  filepath: impl Into<PathBuf>,
  arguments: Vec<String>,
) -> Dispatcher {
  let name = name.into();
  let linux = Arc::new(StartCaptureLinux {
    name: name.clone(),
    filepath: filepath.into(),
    arguments,
  });
  Dispatcher::new(name).linux(linux)
}

pub struct StartCaptureLinux {
  name: String,
  filepath: PathBuf,
  arguments: Vec<String>,
}

#[async_trait]
impl Task for StartCaptureLinux {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    capture_requirements()
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let mut args = self.arguments.clone();
    // -U flushes each packet to the file as it arrives, so a later stop
    // leaves a readable capture behind.
    args.push("-U".to_string());
    args.push("-w".to_string());
    args.push(self.filepath.display().to_string());
    spawn_background("tcpdump", &args).await
  }
}

/// Stop the capture started by the step named `start_capture_task_name`.
pub fn stop_named_capture(
  name: impl Into<String>,
  start_capture_task_name: impl Into<String>,
) -> Dispatcher {
  let name = name.into();
  let linux = Arc::new(StopNamedCaptureLinux {
    name: name.clone(),
    capture_task_name: start_capture_task_name.into(),
  });
  Dispatcher::new(name).linux(linux)
}

pub struct StopNamedCaptureLinux {
  name: String,
  capture_task_name: String,
}

#[async_trait]
impl Task for StopNamedCaptureLinux {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    let mut requirements = capture_requirements();
    requirements.push("sudo apt-get install -y procps".to_string());
    requirements
  }

  async fn run(&self, steps: &StepResults) -> TaskResult {
    let recorded = steps.latest(&self.capture_task_name);
    if recorded.is_failure() {
      return recorded;
    }

    let payload = recorded.unwrap();
    let Some(pid) = payload.as_u64() else {
      return TaskResult::Failure(format!(
        "step '{}' did not record a process id: {payload}",
        self.capture_task_name
      ));
    };

    run_command("kill", &[pid.to_string()]).await
  }
}

/// Kill every tcpdump on the node, named or not.
pub fn stop_all_captures(name: impl Into<String>) -> Dispatcher {
  let name = name.into();
  let linux = Arc::new(StopAllCapturesLinux { name: name.clone() });
  Dispatcher::new(name).linux(linux)
}

pub struct StopAllCapturesLinux {
  name: String,
}

#[async_trait]
impl Task for StopAllCapturesLinux {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    vec!["sudo apt-get install -y psmisc".to_string()]
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    run_command("killall", &["-w".to_string(), "tcpdump".to_string()]).await
  }
}
