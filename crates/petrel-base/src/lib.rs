//! Petrel Base
//!
//! This crate provides the two cooperating pieces every petrel task builds
//! on: the node-capability [`Dispatcher`] that resolves a platform-specific
//! task variant for a target node, and the [`StepResults`] store that gives
//! tasks read access to the tagged [`TaskResult`] outcomes of previously
//! executed named steps in the same pipeline run.
//!
//! The external orchestration framework walks a pipeline of steps; for each
//! dispatch-capable step it calls [`Dispatcher::dispatch`] with the target
//! [`Node`], runs the resolved [`Task`], and records the outcome under the
//! step's name. Later steps look earlier steps up by name. [`execute_step`]
//! and [`execute_dispatched`] implement that dispatch → run → record
//! sequence, converting any panic inside a task body into a `Failure`.

mod architecture;
mod dispatch;
mod error;
mod executor;
mod node;
mod result;
mod steps;
mod task;

pub use architecture::Architecture;
pub use dispatch::Dispatcher;
pub use error::{DispatchError, UnrecognizedArchitecture};
pub use executor::{execute_dispatched, execute_step};
pub use node::Node;
pub use result::TaskResult;
pub use steps::StepResults;
pub use task::Task;
