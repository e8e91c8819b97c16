use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnrecognizedArchitecture;

/// Execution-node platform category.
///
/// This is a closed set: values outside it are rejected at the parsing
/// boundary rather than coerced into a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Architecture {
  LinuxAmd64,
  LinuxArm64,
  WindowsAmd64,
}

impl Architecture {
  /// Every recognized platform category.
  pub const ALL: [Architecture; 3] = [
    Architecture::LinuxAmd64,
    Architecture::LinuxArm64,
    Architecture::WindowsAmd64,
  ];

  pub fn is_linux(&self) -> bool {
    matches!(self, Architecture::LinuxAmd64 | Architecture::LinuxArm64)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Architecture::LinuxAmd64 => "linux-amd64",
      Architecture::LinuxArm64 => "linux-arm64",
      Architecture::WindowsAmd64 => "windows-amd64",
    }
  }
}

impl fmt::Display for Architecture {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Architecture {
  type Err = UnrecognizedArchitecture;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "linux-amd64" => Ok(Architecture::LinuxAmd64),
      "linux-arm64" => Ok(Architecture::LinuxArm64),
      "windows-amd64" => Ok(Architecture::WindowsAmd64),
      other => Err(UnrecognizedArchitecture(other.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_recognized() {
    assert_eq!(
      "linux-arm64".parse::<Architecture>().unwrap(),
      Architecture::LinuxArm64
    );
    for architecture in Architecture::ALL {
      assert_eq!(
        architecture.as_str().parse::<Architecture>().unwrap(),
        architecture
      );
    }
  }

  #[test]
  fn test_parse_rejects_unrecognized() {
    let err = "riscv64".parse::<Architecture>().unwrap_err();
    assert_eq!(err, UnrecognizedArchitecture("riscv64".to_string()));
    assert!("LINUX_AMD64".parse::<Architecture>().is_err());
  }

  #[test]
  fn test_serde_kebab_case() {
    let json = serde_json::to_string(&Architecture::LinuxAmd64).unwrap();
    assert_eq!(json, "\"linux-amd64\"");
    assert!(serde_json::from_str::<Architecture>("\"mystery-arch\"").is_err());
  }
}
