use std::collections::HashMap;
use std::sync::Arc;

use crate::architecture::Architecture;
use crate::error::DispatchError;
use crate::node::Node;
use crate::task::Task;

/// Selects the concrete task variant to run on a target node.
///
/// A dispatcher is built once at pipeline-construction time, before any
/// node is known, with one pre-built variant per supported platform
/// category. Eager construction means parameter errors surface before a
/// node is ever contacted, and repeated [`dispatch`](Self::dispatch) calls
/// for the same category return the identical variant instance, so a
/// variant that accumulates run-time state can be referenced consistently
/// by later steps.
///
/// The dispatcher, not the variant, owns the name later steps use to look
/// this step up: variants differ in *how* they satisfy a capability, never
/// in what the capability is called.
pub struct Dispatcher {
  name: String,
  variants: HashMap<Architecture, Arc<dyn Task>>,
}

impl Dispatcher {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      variants: HashMap::new(),
    }
  }

  /// Register `task` as the variant for `architecture`.
  pub fn variant(mut self, architecture: Architecture, task: Arc<dyn Task>) -> Self {
    self.variants.insert(architecture, task);
    self
  }

  /// Register `task` for both Linux categories. Most variants in the
  /// catalog shell out to Linux tooling and serve amd64 and arm64 alike.
  pub fn linux(self, task: Arc<dyn Task>) -> Self {
    self
      .variant(Architecture::LinuxAmd64, task.clone())
      .variant(Architecture::LinuxArm64, task)
  }

  /// Register `task` for every recognized category.
  pub fn universal(mut self, task: Arc<dyn Task>) -> Self {
    for architecture in Architecture::ALL {
      self.variants.insert(architecture, task.clone());
    }
    self
  }

  /// Step name exposed to the step result store.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Platform categories with a registered variant, in a stable order.
  pub fn supported(&self) -> Vec<Architecture> {
    let mut architectures: Vec<Architecture> = self.variants.keys().copied().collect();
    architectures.sort();
    architectures
  }

  /// Resolve the variant for `node`.
  ///
  /// Returns the same pre-built instance for a given category on every
  /// call. A node whose category has no registered variant is a fatal
  /// compatibility error for this pipeline step, not a task outcome.
  pub fn dispatch(&self, node: &Node) -> Result<Arc<dyn Task>, DispatchError> {
    self
      .variants
      .get(&node.architecture)
      .cloned()
      .ok_or_else(|| DispatchError::PlatformUnsupported {
        task: self.name.clone(),
        architecture: node.architecture,
      })
  }
}
