use async_trait::async_trait;

use crate::result::TaskResult;
use crate::steps::StepResults;

/// A runnable unit of work within a pipeline.
///
/// Implementations are the concrete task variants a [`crate::Dispatcher`]
/// resolves to, as well as platform-independent tasks that are scheduled
/// directly. The step result store is read-only from a task's perspective;
/// recording the outcome is the orchestrator's job.
#[async_trait]
pub trait Task: Send + Sync {
  /// Step name this task is recorded under when executed.
  fn name(&self) -> &str;

  /// Declarative environment-preparation commands the orchestrator must
  /// satisfy on the node before execution. Carried through unmodified;
  /// never executed by the task itself.
  fn requirements(&self) -> Vec<String> {
    Vec::new()
  }

  /// Execute the task body against the results of previously executed
  /// steps.
  async fn run(&self, steps: &StepResults) -> TaskResult;
}

impl std::fmt::Debug for dyn Task {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Task").field("name", &self.name()).finish()
  }
}
