//! Small pipeline utilities.

pub mod network;
pub mod sleep;

pub use network::PortKnock;
pub use sleep::random_sleep;
