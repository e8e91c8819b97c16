//! Failure-path tests for the FTP tasks (no FTP server is available in
//! the test environment).

use std::time::Duration;

use petrel_base::{StepResults, Task, TaskResult};
use petrel_tasks::upload::{RetrieveFromFtp, UploadToFtp};
use std::io::Write;

#[tokio::test]
async fn test_upload_missing_local_file_fails_before_connecting() {
  let steps = StepResults::new();
  let task = UploadToFtp::new(
    "upload",
    "/definitely/not/a/real/file.pcap",
    "127.0.0.1:1",
    "user",
    "secret",
    "/",
    Duration::from_secs(1),
  );

  match task.run(&steps).await {
    TaskResult::Failure(message) => assert!(message.contains("local file does not exist")),
    other => panic!("expected failure, got {other:?}"),
  }
}

#[tokio::test]
async fn test_upload_unreachable_server_fails() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  writeln!(file, "capture bytes").unwrap();

  let steps = StepResults::new();
  let task = UploadToFtp::new(
    "upload",
    file.path(),
    "127.0.0.1:1",
    "user",
    "secret",
    "/",
    Duration::from_secs(1),
  );

  match task.run(&steps).await {
    TaskResult::Failure(message) => assert!(message.contains("failed to connect")),
    other => panic!("expected failure, got {other:?}"),
  }
}

#[tokio::test]
async fn test_retrieve_missing_local_dir_fails_before_connecting() {
  let steps = StepResults::new();
  let task = RetrieveFromFtp::new(
    "retrieve",
    "/captures/capture.pcap",
    "127.0.0.1:1",
    "user",
    "secret",
    "/definitely/not/a/real/dir",
    Duration::from_secs(1),
  );

  match task.run(&steps).await {
    TaskResult::Failure(message) => assert!(message.contains("local directory does not exist")),
    other => panic!("expected failure, got {other:?}"),
  }
}

#[tokio::test]
async fn test_retrieve_unreachable_server_fails() {
  let dir = tempfile::tempdir().unwrap();

  let steps = StepResults::new();
  let task = RetrieveFromFtp::new(
    "retrieve",
    "/captures/capture.pcap",
    "127.0.0.1:1",
    "user",
    "secret",
    dir.path(),
    Duration::from_secs(1),
  );

  match task.run(&steps).await {
    TaskResult::Failure(message) => assert!(message.contains("failed to connect")),
    other => panic!("expected failure, got {other:?}"),
  }
}
