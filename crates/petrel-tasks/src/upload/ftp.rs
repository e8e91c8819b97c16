//! FTP upload and retrieval.
//!
//! The FTP protocol work is blocking, so both tasks run their session on
//! the blocking thread pool.

use std::fs::File;
use std::net::ToSocketAddrs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use petrel_base::{StepResults, Task, TaskResult};
use serde_json::Value;
use suppaftp::FtpStream;
use suppaftp::types::FileType;

/// Uploads a local file to an FTP server.
pub struct UploadToFtp {
  name: String,
  local_filepath: PathBuf,
  ftp_addr: String,
  username: String,
  password: String,
  destination_dir: String,
  timeout: Duration,
}

impl UploadToFtp {
  /// `ftp_addr` is `host` or `host:port`; port 21 is assumed when absent.
  /// `destination_dir` of `"/"` (the default in pipelines) means the
  /// server's login directory.
  pub fn new(
    name: impl Into<String>,
    local_filepath: impl Into<PathBuf>,
    ftp_addr: impl Into<String>,
    username: impl Into<String>,
    password: impl Into<String>,
    destination_dir: impl Into<String>,
    timeout: Duration,
  ) -> Self {
    Self {
      name: name.into(),
      local_filepath: local_filepath.into(),
      ftp_addr: ftp_addr.into(),
      username: username.into(),
      password: password.into(),
      destination_dir: destination_dir.into(),
      timeout,
    }
  }
}

#[async_trait]
impl Task for UploadToFtp {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    if !self.local_filepath.is_file() {
      return TaskResult::Failure(format!(
        "local file does not exist: {}",
        self.local_filepath.display()
      ));
    }

    let local_filepath = self.local_filepath.clone();
    let addr = self.ftp_addr.clone();
    let username = self.username.clone();
    let password = self.password.clone();
    let destination_dir = self.destination_dir.clone();
    let timeout = self.timeout;

    let outcome = tokio::task::spawn_blocking(move || {
      upload(
        &local_filepath,
        &addr,
        &username,
        &password,
        &destination_dir,
        timeout,
      )
    })
    .await;

    match outcome {
      Ok(Ok(message)) => TaskResult::Success(Value::String(message)),
      Ok(Err(message)) => TaskResult::Failure(message),
      Err(e) => TaskResult::Failure(format!("upload task failed: {e}")),
    }
  }
}

fn upload(
  local_filepath: &Path,
  addr: &str,
  username: &str,
  password: &str,
  destination_dir: &str,
  timeout: Duration,
) -> Result<String, String> {
  let mut ftp = open_session(addr, username, password, timeout)?;

  if !destination_dir.is_empty() && destination_dir != "/" {
    ftp
      .cwd(destination_dir)
      .map_err(|e| format!("failed to change to {destination_dir}: {e}"))?;
  }

  let remote_filename = local_filepath
    .file_name()
    .and_then(|name| name.to_str())
    .ok_or_else(|| format!("invalid local file name: {}", local_filepath.display()))?;

  let mut file =
    File::open(local_filepath).map_err(|e| format!("failed to open local file: {e}"))?;
  ftp
    .put_file(remote_filename, &mut file)
    .map_err(|e| format!("failed to upload {remote_filename}: {e}"))?;
  let _ = ftp.quit();

  Ok(format!(
    "successfully uploaded {} to {addr}{destination_dir}",
    local_filepath.display()
  ))
}

/// Retrieves a file from an FTP server into a local directory.
pub struct RetrieveFromFtp {
  name: String,
  remote_filepath: String,
  ftp_addr: String,
  username: String,
  password: String,
  local_dir: PathBuf,
  timeout: Duration,
}

impl RetrieveFromFtp {
  pub fn new(
    name: impl Into<String>,
    remote_filepath: impl Into<String>,
    ftp_addr: impl Into<String>,
    username: impl Into<String>,
    password: impl Into<String>,
    local_dir: impl Into<PathBuf>,
    timeout: Duration,
  ) -> Self {
    Self {
      name: name.into(),
      remote_filepath: remote_filepath.into(),
      ftp_addr: ftp_addr.into(),
      username: username.into(),
      password: password.into(),
      local_dir: local_dir.into(),
      timeout,
    }
  }
}

#[async_trait]
impl Task for RetrieveFromFtp {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    if !self.local_dir.is_dir() {
      return TaskResult::Failure(format!(
        "local directory does not exist: {}",
        self.local_dir.display()
      ));
    }

    let remote_filepath = self.remote_filepath.clone();
    let addr = self.ftp_addr.clone();
    let username = self.username.clone();
    let password = self.password.clone();
    let local_dir = self.local_dir.clone();
    let timeout = self.timeout;

    let outcome = tokio::task::spawn_blocking(move || {
      retrieve(
        &remote_filepath,
        &addr,
        &username,
        &password,
        &local_dir,
        timeout,
      )
    })
    .await;

    match outcome {
      Ok(Ok(message)) => TaskResult::Success(Value::String(message)),
      Ok(Err(message)) => TaskResult::Failure(message),
      Err(e) => TaskResult::Failure(format!("retrieve task failed: {e}")),
    }
  }
}

fn retrieve(
  remote_filepath: &str,
  addr: &str,
  username: &str,
  password: &str,
  local_dir: &Path,
  timeout: Duration,
) -> Result<String, String> {
  let mut ftp = open_session(addr, username, password, timeout)?;

  let (remote_dir, remote_filename) = match remote_filepath.rsplit_once('/') {
    Some((dir, file)) => (dir, file),
    None => ("", remote_filepath),
  };
  if !remote_dir.is_empty() {
    ftp
      .cwd(remote_dir)
      .map_err(|e| format!("failed to change to {remote_dir}: {e}"))?;
  }

  let buffer = ftp
    .retr_as_buffer(remote_filename)
    .map_err(|e| format!("failed to retrieve {remote_filename}: {e}"))?;
  let _ = ftp.quit();

  let local_filepath = local_dir.join(remote_filename);
  std::fs::write(&local_filepath, buffer.into_inner())
    .map_err(|e| format!("failed to write {}: {e}", local_filepath.display()))?;

  Ok(format!(
    "successfully downloaded {remote_filepath} to {}",
    local_filepath.display()
  ))
}

pub(crate) fn open_session(
  addr: &str,
  username: &str,
  password: &str,
  timeout: Duration,
) -> Result<FtpStream, String> {
  let addr = if addr.contains(':') {
    addr.to_string()
  } else {
    format!("{addr}:21")
  };

  let socket_addr = addr
    .to_socket_addrs()
    .map_err(|e| format!("failed to resolve {addr}: {e}"))?
    .next()
    .ok_or_else(|| format!("no address found for {addr}"))?;

  let mut ftp = FtpStream::connect_timeout(socket_addr, timeout)
    .map_err(|e| format!("failed to connect to {addr}: {e}"))?;
  ftp
    .login(username, password)
    .map_err(|e| format!("FTP login failed: {e}"))?;
  ftp
    .transfer_type(FileType::Binary)
    .map_err(|e| format!("failed to set binary mode: {e}"))?;

  Ok(ftp)
}
