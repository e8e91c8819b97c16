//! Tagged task outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a single task execution: exactly one of `Success` with an
/// opaque payload or `Failure` with a human-readable message.
///
/// Results are data, not control flow: a `Failure` flows through the step
/// result store like any other value and must be explicitly checked and
/// propagated (or tolerated) by each consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "payload", rename_all = "snake_case")]
pub enum TaskResult {
  Success(Value),
  Failure(String),
}

impl TaskResult {
  /// Wrap any serializable payload as a `Success`.
  pub fn success(payload: impl Serialize) -> Self {
    match serde_json::to_value(payload) {
      Ok(value) => TaskResult::Success(value),
      Err(e) => TaskResult::Failure(format!("failed to serialize payload: {e}")),
    }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    TaskResult::Failure(message.into())
  }

  pub fn is_success(&self) -> bool {
    matches!(self, TaskResult::Success(_))
  }

  pub fn is_failure(&self) -> bool {
    matches!(self, TaskResult::Failure(_))
  }

  /// The payload, if this is a `Success`.
  pub fn payload(&self) -> Option<&Value> {
    match self {
      TaskResult::Success(value) => Some(value),
      TaskResult::Failure(_) => None,
    }
  }

  /// Apply `f` to the payload of a `Success`; a `Failure` passes through
  /// unchanged.
  pub fn map(self, f: impl FnOnce(Value) -> Value) -> Self {
    match self {
      TaskResult::Success(value) => TaskResult::Success(f(value)),
      failure => failure,
    }
  }

  /// Return the payload of a `Success`.
  ///
  /// # Panics
  ///
  /// Panics with the failure message when called on a `Failure`. Call sites
  /// rely on this to abort the current step on a dependency they trusted to
  /// have succeeded; the execution boundary ([`crate::execute_step`])
  /// converts the panic into the step's own `Failure`.
  pub fn unwrap(self) -> Value {
    match self {
      TaskResult::Success(value) => value,
      TaskResult::Failure(message) => panic!("{message}"),
    }
  }

  /// The payload of a `Success`, or `default` for a `Failure`.
  pub fn unwrap_or(self, default: Value) -> Value {
    match self {
      TaskResult::Success(value) => value,
      TaskResult::Failure(_) => default,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_map_applies_on_success_only() {
    let doubled = TaskResult::Success(json!(21)).map(|v| json!(v.as_i64().unwrap() * 2));
    assert_eq!(doubled, TaskResult::Success(json!(42)));

    let failure = TaskResult::failure("boom").map(|_| json!("never"));
    assert_eq!(failure, TaskResult::Failure("boom".to_string()));
  }

  #[test]
  fn test_unwrap_success() {
    assert_eq!(TaskResult::Success(json!("pid")).unwrap(), json!("pid"));
  }

  #[test]
  #[should_panic(expected = "boom")]
  fn test_unwrap_failure_panics_with_message() {
    TaskResult::failure("boom").unwrap();
  }

  #[test]
  fn test_unwrap_or_default_on_failure() {
    assert_eq!(TaskResult::failure("boom").unwrap_or(json!(0)), json!(0));
    assert_eq!(TaskResult::Success(json!(1)).unwrap_or(json!(0)), json!(1));
  }

  #[test]
  fn test_success_serializes_payload() {
    #[derive(Serialize)]
    struct Report {
      rtt: f64,
    }
    let result = TaskResult::success(Report { rtt: 1.5 });
    assert_eq!(result, TaskResult::Success(json!({"rtt": 1.5})));
  }

  #[test]
  fn test_serde_round_trip() {
    let result = TaskResult::Success(json!({"pid": 4321}));
    let encoded = serde_json::to_string(&result).unwrap();
    assert_eq!(serde_json::from_str::<TaskResult>(&encoded).unwrap(), result);
  }
}
