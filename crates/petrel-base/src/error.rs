use thiserror::Error;

use crate::architecture::Architecture;

/// Errors raised by [`crate::Dispatcher::dispatch`].
///
/// Dispatch failures represent pipeline-construction/compatibility errors,
/// not runtime task outcomes, so they are hard errors rather than
/// [`crate::TaskResult`] values and are never retried.
#[derive(Debug, Error)]
pub enum DispatchError {
  #[error("task '{task}' is not implemented for architecture: {architecture}")]
  PlatformUnsupported {
    task: String,
    architecture: Architecture,
  },
}

/// A platform string outside the closed [`Architecture`] set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized architecture: {0}")]
pub struct UnrecognizedArchitecture(pub String);
