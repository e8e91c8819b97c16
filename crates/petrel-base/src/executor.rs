//! The dispatch → run → record boundary.
//!
//! These helpers implement the strictly sequential per-step contract the
//! external orchestrator follows. They are also the panic boundary: an
//! uncaught panic inside a task body (for example an
//! [`TaskResult::unwrap`] on a dependency that turned out to be a
//! `Failure`) becomes that step's own `Failure`, recorded exactly once, so
//! one failing task never takes the orchestrator down with it.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{error, info, instrument};

use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::node::Node;
use crate::result::TaskResult;
use crate::steps::StepResults;
use crate::task::Task;

/// Run `task` and record its outcome under `name`.
#[instrument(name = "execute_step", skip(task, steps), fields(step = %name))]
pub async fn execute_step(name: &str, task: &dyn Task, steps: &mut StepResults) -> TaskResult {
  info!("task_started");

  let result = match AssertUnwindSafe(task.run(steps)).catch_unwind().await {
    Ok(result) => result,
    Err(panic) => TaskResult::Failure(panic_description(panic.as_ref())),
  };

  match &result {
    TaskResult::Success(payload) => info!(payload = %payload, "task_completed"),
    TaskResult::Failure(message) => error!(message = %message, "task_failed"),
  }

  steps.record(name, result.clone());
  result
}

/// Resolve the variant for `node` and execute it under the dispatcher's
/// name. A node without a registered variant aborts the step with
/// [`DispatchError::PlatformUnsupported`] before anything runs or is
/// recorded.
pub async fn execute_dispatched(
  dispatcher: &Dispatcher,
  node: &Node,
  steps: &mut StepResults,
) -> Result<TaskResult, DispatchError> {
  let task = dispatcher.dispatch(node)?;
  Ok(execute_step(dispatcher.name(), task.as_ref(), steps).await)
}

fn panic_description(panic: &(dyn Any + Send)) -> String {
  if let Some(message) = panic.downcast_ref::<String>() {
    message.clone()
  } else if let Some(message) = panic.downcast_ref::<&str>() {
    (*message).to_string()
  } else {
    "task panicked with a non-string payload".to_string()
  }
}
