//! tshark-based capture.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use petrel_base::{Dispatcher, StepResults, Task, TaskResult};

use crate::process::{run_command, spawn_background};

/// Start a tshark capture writing to `filepath`.
///
/// `arguments` are passed through to tshark; `-w <filepath>` is appended
/// unless the caller already supplied a `-w`.
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
    vec!["sudo apt-get install -y tshark".to_string()]
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let mut args = self.arguments.clone();
    if !args.iter().any(|arg| arg == "-w") {
      args.push("-w".to_string());
      args.push(self.filepath.display().to_string());
    }
    spawn_background("tshark", &args).await
  }
}

/// Stop a tshark capture.
///
/// With a producing step name, the pid recorded by that step is looked up
/// and killed; without one, every tshark on the node is killed.
pub fn stop_capture(name: impl Into<String>, capture_task_name: Option<String>) -> Dispatcher {
  let name = name.into();
  let linux = Arc::new(StopCaptureLinux {
    name: name.clone(),
    capture_task_name,
  });
  Dispatcher::new(name).linux(linux)
}

pub struct StopCaptureLinux {
  name: String,
  capture_task_name: Option<String>,
}

#[async_trait]
impl Task for StopCaptureLinux {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    vec![
      "sudo apt-get install -y procps".to_string(),
      "sudo apt-get install -y psmisc".to_string(),
    ]
  }

  async fn run(&self, steps: &StepResults) -> TaskResult {
    let Some(capture_task_name) = &self.capture_task_name else {
      return run_command(
        "killall",
        &["-s".to_string(), "SIGKILL".to_string(), "tshark".to_string()],
      )
      .await;
    };

    let recorded = steps.latest(capture_task_name);
    if recorded.is_failure() {
      return recorded;
    }

    let payload = recorded.unwrap();
    let Some(pid) = payload.as_u64() else {
      return TaskResult::Failure(format!(
        "step '{capture_task_name}' did not record a process id: {payload}"
      ));
    };

    run_command("kill", &["-9".to_string(), pid.to_string()]).await
  }
}
