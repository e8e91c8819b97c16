//! Petrel
//!
//! A library of measurement and network-testing tasks for an external
//! distributed-experiment orchestration framework. The framework schedules
//! tasks on remote nodes and chains them into pipelines; this crate supplies
//! the node-capability dispatch mechanism, the named-step result store, and
//! a catalog of leaf tasks (speedtests, packet capture, data transfer, FTP,
//! probes) built on top of them.
//!
//! - [`base`] — the dispatch + result-store core: [`base::Dispatcher`],
//!   [`base::StepResults`], [`base::TaskResult`], the [`base::Task`] trait.
//! - [`tasks`] — the leaf-task catalog, organized by category.

pub use petrel_base as base;
pub use petrel_tasks as tasks;
