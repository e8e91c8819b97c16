//! Subprocess helpers shared by the catalog.

use std::process::Stdio;
use std::time::Duration;

use petrel_base::TaskResult;
use serde_json::{Value, json};
use tokio::process::Command;

/// How long a background process gets to fail fast before we report it as
/// started. Race-tolerant heuristic, not a liveness guarantee.
const BACKGROUND_GRACE: Duration = Duration::from_secs(2);

/// Run `program` to completion, capturing stdout and stderr.
///
/// Exit code zero yields `Success` with the combined output; anything else
/// yields `Failure` with the same text. A program that cannot be started
/// at all is a `Failure` too, never a panic.
pub async fn run_command(program: &str, args: &[String]) -> TaskResult {
  let output = match Command::new(program).args(args).output().await {
    Ok(output) => output,
    Err(e) => return TaskResult::Failure(format!("failed to start {program}: {e}")),
  };

  let text = combined_output(&output.stdout, &output.stderr);
  if output.status.success() {
    TaskResult::Success(Value::String(text))
  } else {
    TaskResult::Failure(text)
  }
}

/// As [`run_command`], aborting with a `Failure` once `timeout` elapses.
/// The child is killed when the timeout fires.
pub async fn run_command_with_timeout(
  program: &str,
  args: &[String],
  timeout: Duration,
) -> TaskResult {
  let future = Command::new(program).args(args).kill_on_drop(true).output();
  match tokio::time::timeout(timeout, future).await {
    Err(_) => TaskResult::Failure(format!(
      "{program} timed out after {} seconds",
      timeout.as_secs()
    )),
    Ok(Err(e)) => TaskResult::Failure(format!("failed to start {program}: {e}")),
    Ok(Ok(output)) => {
      let text = combined_output(&output.stdout, &output.stderr);
      if output.status.success() {
        TaskResult::Success(Value::String(text))
      } else {
        TaskResult::Failure(text)
      }
    }
  }
}

/// Start `program` detached and report its process id.
///
/// Follows the fixed background-start convention: spawn, wait a short
/// grace period, poll once for early termination. Still running means
/// `Success` with the pid for a later named "stop" step to look up;
/// already exited means `Failure` carrying the captured output.
pub async fn spawn_background(program: &str, args: &[String]) -> TaskResult {
  let mut child = match Command::new(program)
    .args(args)
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
  {
    Ok(child) => child,
    Err(e) => return TaskResult::Failure(format!("failed to start {program}: {e}")),
  };

  tokio::time::sleep(BACKGROUND_GRACE).await;

  match child.try_wait() {
    Ok(None) => match child.id() {
      Some(pid) => TaskResult::Success(json!(pid)),
      None => TaskResult::Failure(format!("{program} exited during startup")),
    },
    Ok(Some(status)) => {
      let text = match child.wait_with_output().await {
        Ok(output) => combined_output(&output.stdout, &output.stderr),
        Err(e) => format!("failed to collect output: {e}"),
      };
      TaskResult::Failure(format!("{program} terminated with {status}\n{text}"))
    }
    Err(e) => TaskResult::Failure(format!("failed to poll {program}: {e}")),
  }
}

fn combined_output(stdout: &[u8], stderr: &[u8]) -> String {
  let mut text = String::new();
  if !stdout.is_empty() {
    text.push_str(&String::from_utf8_lossy(stdout));
    text.push('\n');
  }
  if !stderr.is_empty() {
    text.push_str(&String::from_utf8_lossy(stderr));
  }
  text
}
