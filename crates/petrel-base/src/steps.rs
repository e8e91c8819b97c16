//! The step result store.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::TaskResult;

/// Append-only, insertion-ordered mapping from step name to the outcomes of
/// every task executed under that name so far in one pipeline run.
///
/// Created empty at pipeline-run start, populated by the orchestrator after
/// each step completes, read-only from a task's perspective, and discarded
/// at end of run. A step that is retried produces multiple entries under
/// its name; consumers read the last entry unless they have a reason to
/// inspect the whole history.
///
/// Looking up a name that was never recorded yields a `Failure` describing
/// the miss, so consumers branch on "is this a `Failure`" rather than on
/// "does this name exist". A lookup of a not-yet-recorded name does not
/// block: scheduling a consumer before its producer is a
/// pipeline-construction bug this store cannot detect.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StepResults {
  entries: IndexMap<String, Vec<TaskResult>>,
}

impl StepResults {
  pub fn new() -> Self {
    Self::default()
  }

  /// The standard lookup default for a never-recorded step name.
  pub fn not_found(name: &str) -> TaskResult {
    TaskResult::Failure(format!("{name} not found"))
  }

  /// Append `result` to the list recorded under `name`, creating the list
  /// if absent. Called once per task execution by the orchestrator.
  pub fn record(&mut self, name: impl Into<String>, result: TaskResult) {
    self
      .entries
      .entry(name.into())
      .or_insert_with(Vec::new)
      .push(result);
  }

  /// All results recorded under `name`, in execution order, or
  /// `[Failure("<name> not found")]` if the name was never recorded.
  pub fn lookup(&self, name: &str) -> Vec<TaskResult> {
    self.lookup_or(name, Self::not_found(name))
  }

  /// As [`lookup`](Self::lookup), with a caller-supplied default.
  pub fn lookup_or(&self, name: &str, default: TaskResult) -> Vec<TaskResult> {
    match self.entries.get(name) {
      Some(results) => results.clone(),
      None => vec![default],
    }
  }

  /// The most recent result recorded under `name`, or the not-found
  /// `Failure`.
  pub fn latest(&self, name: &str) -> TaskResult {
    self
      .entries
      .get(name)
      .and_then(|results| results.last())
      .cloned()
      .unwrap_or_else(|| Self::not_found(name))
  }

  /// Resolve a required dependency: every payload recorded under `name`,
  /// or the first `Failure` encountered (including the not-found default),
  /// to be propagated verbatim as the consumer's own result.
  pub fn require(&self, name: &str) -> Result<Vec<Value>, TaskResult> {
    let mut payloads = Vec::new();
    for result in self.lookup(name) {
      match result {
        TaskResult::Success(value) => payloads.push(value),
        failure => return Err(failure),
      }
    }
    Ok(payloads)
  }

  /// Resolve a tolerated dependency: `None` when the step is missing or
  /// recorded any `Failure` (the dependency is skipped, never defaulted),
  /// `Some(payloads)` otherwise.
  pub fn tolerate(&self, name: &str) -> Option<Vec<Value>> {
    self.require(name).ok()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entries.contains_key(name)
  }

  /// Step names in insertion (= execution) order.
  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_record_appends_in_order() {
    let mut steps = StepResults::new();
    steps.record("speedtest", TaskResult::Success(json!(1)));
    steps.record("speedtest", TaskResult::failure("retry exhausted"));
    steps.record("capture", TaskResult::Success(json!(4321)));

    assert_eq!(
      steps.lookup("speedtest"),
      vec![
        TaskResult::Success(json!(1)),
        TaskResult::Failure("retry exhausted".to_string()),
      ]
    );
    assert_eq!(steps.names().collect::<Vec<_>>(), vec!["speedtest", "capture"]);
  }

  #[test]
  fn test_lookup_missing_yields_not_found_failure() {
    let steps = StepResults::new();
    assert_eq!(
      steps.lookup("send"),
      vec![TaskResult::Failure("send not found".to_string())]
    );
    assert_eq!(
      steps.lookup_or("send", TaskResult::Success(json!(null))),
      vec![TaskResult::Success(json!(null))]
    );
  }

  #[test]
  fn test_latest_reads_last_entry() {
    let mut steps = StepResults::new();
    steps.record("capture", TaskResult::Success(json!(100)));
    steps.record("capture", TaskResult::Success(json!(4321)));
    assert_eq!(steps.latest("capture"), TaskResult::Success(json!(4321)));
    assert_eq!(
      steps.latest("missing"),
      TaskResult::Failure("missing not found".to_string())
    );
  }

  #[test]
  fn test_require_short_circuits_on_first_failure() {
    let mut steps = StepResults::new();
    steps.record("a", TaskResult::Success(json!(1)));
    steps.record("a", TaskResult::failure("boom"));
    steps.record("a", TaskResult::Success(json!(3)));

    assert_eq!(
      steps.require("a").unwrap_err(),
      TaskResult::Failure("boom".to_string())
    );
    assert_eq!(
      steps.require("missing").unwrap_err(),
      TaskResult::Failure("missing not found".to_string())
    );
  }

  #[test]
  fn test_require_collects_all_payloads() {
    let mut steps = StepResults::new();
    steps.record("a", TaskResult::Success(json!(1)));
    steps.record("a", TaskResult::Success(json!(2)));
    assert_eq!(steps.require("a").unwrap(), vec![json!(1), json!(2)]);
  }

  #[test]
  fn test_tolerate_skips_failures() {
    let mut steps = StepResults::new();
    steps.record("a", TaskResult::failure("boom"));
    steps.record("c", TaskResult::Success(json!("healthy")));

    assert_eq!(steps.tolerate("a"), None);
    assert_eq!(steps.tolerate("missing"), None);
    assert_eq!(steps.tolerate("c"), Some(vec![json!("healthy")]));
  }
}
