//! Moving step results off the node.
//!
//! [`send::SendData`] aggregates the recorded outcomes of earlier named
//! steps and posts them to an analysis endpoint; [`fetch::FetchData`] takes
//! the identifier the endpoint handed back (through the step result store)
//! and retrieves the analysis.

pub mod fetch;
pub mod handlers;
pub mod send;

pub use fetch::FetchData;
pub use send::{DataType, SendData, TaskDescriptor};
