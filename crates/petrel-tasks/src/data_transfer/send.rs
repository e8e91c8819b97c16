//! Send aggregated step results to an analysis endpoint.

use async_trait::async_trait;
use petrel_base::{StepResults, Task, TaskResult};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;
use url::Url;
use uuid::Uuid;

/// Wire tag for the kind of measurement a dependency produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataType {
  OoklaSpeedtest,
  MlabSpeedtest,
}

/// Transform applied to a dependency's payloads before they go on the
/// wire (strip noisy fields, re-wrap, ...). See [`super::handlers`].
pub type ResultHandler = fn(&[Value]) -> Value;

/// One upstream step this task depends on.
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
  /// Step name to look up in the result store.
  pub name: String,
  pub datatype: DataType,
  pub handler: Option<ResultHandler>,
}

impl TaskDescriptor {
  pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
    Self {
      name: name.into(),
      datatype,
      handler: None,
    }
  }

  pub fn with_handler(mut self, handler: ResultHandler) -> Self {
    self.handler = Some(handler);
    self
  }
}

/// Posts the outcomes of earlier named steps to an endpoint as one
/// execution report.
///
/// With `allow_failure`, dependencies that failed (or were never recorded)
/// are omitted from the report; they are never replaced with defaults.
/// Without it, the first failed dependency short-circuits and becomes this
/// task's own result.
pub struct SendData {
  name: String,
  descriptors: Vec<TaskDescriptor>,
  endpoint: Url,
  allow_failure: bool,
  client: reqwest::Client,
}

impl SendData {
  pub fn new(
    name: impl Into<String>,
    descriptors: Vec<TaskDescriptor>,
    endpoint: Url,
    allow_failure: bool,
  ) -> Self {
    Self {
      name: name.into(),
      descriptors,
      endpoint,
      allow_failure,
      client: reqwest::Client::new(),
    }
  }
}

#[async_trait]
impl Task for SendData {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, steps: &StepResults) -> TaskResult {
    let execution_results =
      match build_execution_results(steps, &self.descriptors, self.allow_failure) {
        Ok(results) => results,
        Err(failure) => return failure,
      };

    let (location, _lat, _lon) = geolocate_ip(&self.client, GEOLOCATION_PROBE_IP).await;

    let body = json!({
      "data": {
        "execution_id": Uuid::new_v4().to_string(),
        "execution_results": execution_results,
      },
      "location": location,
    });

    let response = match self.client.post(self.endpoint.clone()).json(&body).send().await {
      Ok(response) => response,
      Err(e) => return TaskResult::Failure(format!("failed to transfer data: {e}")),
    };

    let status = response.status();
    if status == StatusCode::OK {
      match response.json::<Value>().await {
        Ok(payload) => TaskResult::Success(payload),
        Err(e) => TaskResult::Failure(format!("endpoint returned invalid JSON: {e}")),
      }
    } else {
      let text = response.text().await.unwrap_or_default();
      TaskResult::Failure(format!("failed to transfer data: {status} {text}"))
    }
  }
}

/// Resolve every dependency per the standard idiom and shape the wire
/// entries. A disallowed failure is returned verbatim for the caller to
/// propagate as its own result.
fn build_execution_results(
  steps: &StepResults,
  descriptors: &[TaskDescriptor],
  allow_failure: bool,
) -> Result<Vec<Value>, TaskResult> {
  let mut execution_results = Vec::new();

  for descriptor in descriptors {
    let payloads = if allow_failure {
      match steps.tolerate(&descriptor.name) {
        Some(payloads) => payloads,
        None => continue,
      }
    } else {
      steps.require(&descriptor.name)?
    };

    let task_results = match descriptor.handler {
      Some(handler) => handler(&payloads),
      None => Value::Array(payloads),
    };

    execution_results.push(json!({
      "task_type": descriptor.datatype,
      "task_results": task_results,
    }));
  }

  Ok(execution_results)
}

const GEOLOCATION_PROBE_IP: &str = "8.8.8.8";
const FALLBACK_CITY: &str = "losangeles";
const FALLBACK_LAT: f64 = 34.0549;
const FALLBACK_LON: f64 = 118.2426;

/// Coarse city-level geolocation via ip-api.com, falling back to a fixed
/// location when the lookup fails or returns no city.
async fn geolocate_ip(client: &reqwest::Client, ip: &str) -> (String, f64, f64) {
  let fallback = (FALLBACK_CITY.to_string(), FALLBACK_LAT, FALLBACK_LON);

  let response = match client
    .get(format!("http://ip-api.com/json/{ip}"))
    .send()
    .await
  {
    Ok(response) => response,
    Err(e) => {
      warn!(error = %e, "geolocation request failed, using fallback");
      return fallback;
    }
  };

  let Ok(payload) = response.json::<Value>().await else {
    return fallback;
  };
  let Some(city) = payload.get("city").and_then(Value::as_str) else {
    return fallback;
  };

  let (lat, lon) = payload
    .get("loc")
    .and_then(Value::as_str)
    .and_then(|loc| loc.split_once(','))
    .and_then(|(lat, lon)| Some((lat.parse().ok()?, lon.parse().ok()?)))
    .unwrap_or((FALLBACK_LAT, FALLBACK_LON));

  (city.to_string(), lat, lon)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data_transfer::handlers::{mlab_handler, ookla_handler};

  fn recorded_steps() -> StepResults {
    let mut steps = StepResults::new();
    steps.record(
      "ookla",
      TaskResult::Success(json!({"download": 940, "interface": "eth0"})),
    );
    steps.record("mlab", TaskResult::Success(json!({"download": 890})));
    steps
  }

  #[test]
  fn test_builds_wire_entries_in_descriptor_order() {
    let steps = recorded_steps();
    let descriptors = vec![
      TaskDescriptor::new("ookla", DataType::OoklaSpeedtest),
      TaskDescriptor::new("mlab", DataType::MlabSpeedtest),
    ];

    let results = build_execution_results(&steps, &descriptors, false).unwrap();
    assert_eq!(
      results,
      vec![
        json!({
          "task_type": "ookla-speedtest",
          "task_results": [{"download": 940, "interface": "eth0"}],
        }),
        json!({
          "task_type": "mlab-speedtest",
          "task_results": [{"download": 890}],
        }),
      ]
    );
  }

  #[test]
  fn test_handlers_shape_task_results() {
    let steps = recorded_steps();
    let descriptors = vec![
      TaskDescriptor::new("ookla", DataType::OoklaSpeedtest).with_handler(ookla_handler),
      TaskDescriptor::new("mlab", DataType::MlabSpeedtest).with_handler(mlab_handler),
    ];

    let results = build_execution_results(&steps, &descriptors, false).unwrap();
    assert_eq!(
      results[0]["task_results"],
      json!([{"download": 940}]),
      "ookla handler strips the interface field"
    );
    assert_eq!(
      results[1]["task_results"],
      json!({"data": [{"download": 890}]}),
      "mlab handler wraps samples in a data envelope"
    );
  }

  #[test]
  fn test_disallowed_failure_short_circuits_verbatim() {
    let mut steps = StepResults::new();
    steps.record("ookla", TaskResult::failure("boom"));
    steps.record("mlab", TaskResult::Success(json!({"download": 890})));

    let descriptors = vec![
      TaskDescriptor::new("ookla", DataType::OoklaSpeedtest),
      TaskDescriptor::new("mlab", DataType::MlabSpeedtest),
    ];

    let failure = build_execution_results(&steps, &descriptors, false).unwrap_err();
    assert_eq!(failure, TaskResult::Failure("boom".to_string()));
  }

  #[test]
  fn test_missing_dependency_short_circuits_with_not_found() {
    let steps = StepResults::new();
    let descriptors = vec![TaskDescriptor::new("ookla", DataType::OoklaSpeedtest)];

    let failure = build_execution_results(&steps, &descriptors, false).unwrap_err();
    assert_eq!(failure, TaskResult::Failure("ookla not found".to_string()));
  }

  #[test]
  fn test_allow_failure_omits_failed_dependencies() {
    let mut steps = StepResults::new();
    steps.record("ookla", TaskResult::failure("boom"));
    steps.record("mlab", TaskResult::Success(json!({"download": 890})));

    let descriptors = vec![
      TaskDescriptor::new("ookla", DataType::OoklaSpeedtest),
      TaskDescriptor::new("never-ran", DataType::OoklaSpeedtest),
      TaskDescriptor::new("mlab", DataType::MlabSpeedtest),
    ];

    let results = build_execution_results(&steps, &descriptors, true).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["task_type"], "mlab-speedtest");
  }
}
