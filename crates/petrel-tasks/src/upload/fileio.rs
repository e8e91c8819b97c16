//! Upload to file.io temporary storage.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use petrel_base::{Dispatcher, StepResults, Task, TaskResult};

use crate::process::run_command;

/// Upload `filepath` to file.io; the link expires after `expires`
/// (file.io notation, e.g. `"14d"`).
pub fn upload_to_fileio(
  name: impl Into<String>,
  filepath: impl Into<PathBuf>,
  expires: impl Into<String>,
) -> Dispatcher {
  let name = name.into();
  let linux = Arc::new(UploadToFileIoCurl {
    name: name.clone(),
    filepath: filepath.into(),
    expires: expires.into(),
  });
  Dispatcher::new(name).linux(linux)
}

pub struct UploadToFileIoCurl {
  name: String,
  filepath: PathBuf,
  expires: String,
}

#[async_trait]
impl Task for UploadToFileIoCurl {
  fn name(&self) -> &str {
    &self.name
  }

  fn requirements(&self) -> Vec<String> {
    vec!["sudo apt-get install -y curl".to_string()]
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let args = vec![
      "-F".to_string(),
      format!("file=@{}", self.filepath.display()),
      format!("https://file.io?expires={}", self.expires),
    ];
    run_command("curl", &args).await
  }
}
