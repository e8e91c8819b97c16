//! Payload transforms applied before results go on the wire.

use serde_json::{Value, json};

/// Ookla samples carry a node-local `interface` block the analysis
/// endpoint has no use for; drop it from every sample.
pub fn ookla_handler(results: &[Value]) -> Value {
  let cleaned: Vec<Value> = results
    .iter()
    .cloned()
    .map(|mut sample| {
      if let Some(object) = sample.as_object_mut() {
        object.remove("interface");
      }
      sample
    })
    .collect();
  Value::Array(cleaned)
}

/// M-Lab samples are expected wrapped in a `data` envelope.
pub fn mlab_handler(results: &[Value]) -> Value {
  json!({ "data": results })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ookla_handler_strips_interface_only() {
    let samples = vec![
      json!({"download": 940, "interface": "eth0"}),
      json!({"download": 120}),
    ];
    assert_eq!(
      ookla_handler(&samples),
      json!([{"download": 940}, {"download": 120}])
    );
  }

  #[test]
  fn test_ookla_handler_leaves_non_objects_alone() {
    let samples = vec![json!(42)];
    assert_eq!(ookla_handler(&samples), json!([42]));
  }

  #[test]
  fn test_mlab_handler_wraps_in_data_envelope() {
    let samples = vec![json!({"download": 890})];
    assert_eq!(mlab_handler(&samples), json!({"data": [{"download": 890}]}));
  }
}
