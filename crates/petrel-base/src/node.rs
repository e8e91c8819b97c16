use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::architecture::Architecture;

/// Descriptor of a target execution node, consumed from the external
/// orchestrator. Immutable for the duration of dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub name: String,
  pub architecture: Architecture,
  /// Free-form node attributes reported by the orchestrator.
  #[serde(default)]
  pub properties: HashMap<String, serde_json::Value>,
}

impl Node {
  pub fn new(name: impl Into<String>, architecture: Architecture) -> Self {
    Self {
      name: name.into(),
      architecture,
      properties: HashMap::new(),
    }
  }

  pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
    self.properties.insert(key.into(), value);
    self
  }
}
