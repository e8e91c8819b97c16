//! Connection-attempt utilities.

use async_trait::async_trait;
use petrel_base::{StepResults, Task, TaskResult};
use serde_json::json;
use tokio::net::TcpStream;

/// Opens (and immediately closes) a TCP connection to signal a listener.
///
/// The connection outcome is deliberately ignored: the knock itself is the
/// point.
pub struct PortKnock {
  name: String,
  ip: String,
  port: u16,
}

impl PortKnock {
  pub fn new(name: impl Into<String>, ip: impl Into<String>, port: u16) -> Self {
    Self {
      name: name.into(),
      ip: ip.into(),
      port,
    }
  }
}

#[async_trait]
impl Task for PortKnock {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let _ = TcpStream::connect((self.ip.as_str(), self.port)).await;
    TaskResult::Success(json!(0))
  }
}
