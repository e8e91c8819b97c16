//! Fetch the analysis produced for an earlier send step.

use async_trait::async_trait;
use petrel_base::{StepResults, Task, TaskResult};
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

/// Retrieves the analysis for a result previously uploaded by a
/// [`super::SendData`] step.
///
/// The send step's `Success` payload carries a `result_id`; this task
/// looks the send step up by name, extracts the identifier from the first
/// successful execution, and queries the endpoint with it.
pub struct FetchData {
  name: String,
  send_data_task: String,
  endpoint: Url,
  client: reqwest::Client,
}

impl FetchData {
  pub fn new(
    name: impl Into<String>,
    send_data_task: impl Into<String>,
    endpoint: Url,
  ) -> Self {
    Self {
      name: name.into(),
      send_data_task: send_data_task.into(),
      endpoint,
      client: reqwest::Client::new(),
    }
  }
}

#[async_trait]
impl Task for FetchData {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, steps: &StepResults) -> TaskResult {
    // A send step that never ran surfaces its lookup default directly.
    if !steps.contains(&self.send_data_task) {
      return steps.latest(&self.send_data_task);
    }

    let entries = steps.lookup(&self.send_data_task);
    let Some(result_id) = first_success_result_id(&entries) else {
      return TaskResult::Failure(format!(
        "failed to obtain a result id from '{}'",
        self.send_data_task
      ));
    };

    let result_id = match result_id {
      Value::String(id) => id,
      other => other.to_string(),
    };

    let response = match self
      .client
      .get(self.endpoint.clone())
      .query(&[("result_id", result_id.as_str())])
      .send()
      .await
    {
      Ok(response) => response,
      Err(e) => return TaskResult::Failure(format!("failed to obtain data: {e}")),
    };

    let status = response.status();
    if status == StatusCode::OK {
      match response.json::<Value>().await {
        Ok(payload) => TaskResult::Success(Value::String(format!("RAG result: {payload}"))),
        Err(e) => TaskResult::Failure(format!("endpoint returned invalid JSON: {e}")),
      }
    } else {
      let text = response.text().await.unwrap_or_default();
      TaskResult::Failure(format!("failed to obtain data: {status} {text}"))
    }
  }
}

/// The `result_id` of the first successful entry, scanning in execution
/// order.
fn first_success_result_id(entries: &[TaskResult]) -> Option<Value> {
  entries
    .iter()
    .filter_map(TaskResult::payload)
    .find_map(|payload| payload.get("result_id").cloned())
}
