//! Ookla speedtest CLI.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use petrel_base::{Dispatcher, StepResults, Task, TaskResult};
use serde_json::json;
use tokio::process::Command;

/// Run the Ookla speedtest CLI in JSON output mode.
///
/// `target_server` pins the test to a specific Ookla server id;
/// `source_ip` binds the test to a specific local address. Both default to
/// letting the CLI choose.
pub fn ookla_speedtest_cli(
  name: impl Into<String>,
  target_server: Option<String>,
  source_ip: Option<String>,
  timeout: Duration,
) -> Dispatcher {
  let name = name.into();
  let linux = Arc::new(OoklaSpeedtestCliLinux {
    name: name.clone(),
    target_server,
    source_ip,
    timeout,
  });
  Dispatcher::new(name).linux(linux)
}

pub struct OoklaSpeedtestCliLinux {
  name: String,
  target_server: Option<String>,
  source_ip: Option<String>,
  timeout: Duration,
}

#[async_trait]
impl Task for OoklaSpeedtestCliLinux {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    vec![
      "sudo DEBIAN_FRONTEND=noninteractive apt-get update -y".to_string(),
      "sudo DEBIAN_FRONTEND=noninteractive apt-get install -y curl gnupg2".to_string(),
      "curl -s https://packagecloud.io/install/repositories/ookla/speedtest-cli/script.deb.sh | sudo bash"
        .to_string(),
      "sudo DEBIAN_FRONTEND=noninteractive apt-get install -y speedtest".to_string(),
    ]
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let mut args = vec![
      "--accept-gdpr".to_string(),
      "--accept-license".to_string(),
      "--progress=no".to_string(),
      "--format=json".to_string(),
      "-v".to_string(),
    ];
    if let Some(server) = &self.target_server {
      args.push(format!("--server-id={server}"));
    }
    if let Some(ip) = &self.source_ip {
      args.push(format!("--ip={ip}"));
    }

    let future = Command::new("speedtest")
      .args(&args)
      .kill_on_drop(true)
      .output();
    let output = match tokio::time::timeout(self.timeout, future).await {
      Err(_) => return TaskResult::Failure("speedtest timed out".to_string()),
      Ok(Err(e)) => return TaskResult::Failure(format!("failed to start speedtest: {e}")),
      Ok(Ok(output)) => output,
    };

    if output.status.success() {
      TaskResult::Success(json!({
        "test_result": String::from_utf8_lossy(&output.stdout),
      }))
    } else {
      TaskResult::Failure(format!(
        "speedtest failed with {}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout).trim(),
        String::from_utf8_lossy(&output.stderr).trim()
      ))
    }
  }
}
