//! Dispatcher contract tests: platform selection, identity stability, and
//! the unsupported-platform hard error.

use std::sync::Arc;

use async_trait::async_trait;
use petrel_base::{
  Architecture, DispatchError, Dispatcher, Node, StepResults, Task, TaskResult, execute_dispatched,
};
use serde_json::json;

struct StaticTask {
  name: String,
  payload: serde_json::Value,
}

#[async_trait]
impl Task for StaticTask {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    vec!["sudo apt-get install -y iputils-ping".to_string()]
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    TaskResult::Success(self.payload.clone())
  }
}

fn static_task(name: &str, payload: serde_json::Value) -> Arc<dyn Task> {
  Arc::new(StaticTask {
    name: name.to_string(),
    payload,
  })
}

#[test]
fn test_dispatch_selects_registered_variant() {
  let v1 = static_task("probe", json!("amd64"));
  let v2 = static_task("probe", json!("arm64"));
  let dispatcher = Dispatcher::new("probe")
    .variant(Architecture::LinuxAmd64, v1)
    .variant(Architecture::LinuxArm64, v2.clone());

  let resolved = dispatcher
    .dispatch(&Node::new("pi-4", Architecture::LinuxArm64))
    .expect("arm64 variant is registered");
  assert!(Arc::ptr_eq(&resolved, &v2));
}

#[test]
fn test_dispatch_is_identity_stable() {
  let task = static_task("probe", json!(true));
  let dispatcher = Dispatcher::new("probe").linux(task);
  let node = Node::new("worker-1", Architecture::LinuxAmd64);

  let first = dispatcher.dispatch(&node).unwrap();
  let second = dispatcher.dispatch(&node).unwrap();
  assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_linux_registers_both_linux_categories() {
  let dispatcher = Dispatcher::new("probe").linux(static_task("probe", json!(true)));
  assert_eq!(
    dispatcher.supported(),
    vec![Architecture::LinuxAmd64, Architecture::LinuxArm64]
  );
}

#[test]
fn test_universal_registers_every_category() {
  let dispatcher = Dispatcher::new("pause").universal(static_task("pause", json!(1)));
  for architecture in Architecture::ALL {
    assert!(
      dispatcher
        .dispatch(&Node::new("any", architecture))
        .is_ok()
    );
  }
}

#[test]
fn test_dispatch_unsupported_platform_is_fatal() {
  let dispatcher = Dispatcher::new("capture").linux(static_task("capture", json!(0)));
  let err = dispatcher
    .dispatch(&Node::new("desktop", Architecture::WindowsAmd64))
    .unwrap_err();

  let DispatchError::PlatformUnsupported { task, architecture } = err;
  assert_eq!(task, "capture");
  assert_eq!(architecture, Architecture::WindowsAmd64);
  assert_eq!(
    format!("{}", DispatchError::PlatformUnsupported { task, architecture }),
    "task 'capture' is not implemented for architecture: windows-amd64"
  );
}

#[tokio::test]
async fn test_execute_dispatched_records_under_dispatcher_name() {
  let dispatcher = Dispatcher::new("speedtest").linux(static_task("speedtest", json!({"mbps": 940})));
  let node = Node::new("worker-1", Architecture::LinuxAmd64);
  let mut steps = StepResults::new();

  let result = execute_dispatched(&dispatcher, &node, &mut steps)
    .await
    .expect("linux variant is registered");

  assert_eq!(result, TaskResult::Success(json!({"mbps": 940})));
  assert_eq!(steps.lookup("speedtest"), vec![result]);
}

#[tokio::test]
async fn test_execute_dispatched_unsupported_records_nothing() {
  let dispatcher = Dispatcher::new("speedtest").linux(static_task("speedtest", json!(0)));
  let node = Node::new("desktop", Architecture::WindowsAmd64);
  let mut steps = StepResults::new();

  assert!(
    execute_dispatched(&dispatcher, &node, &mut steps)
      .await
      .is_err()
  );
  assert!(steps.is_empty());
}
