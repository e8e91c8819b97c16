//! Network-attack probes for authorized testbeds.
//!
//! These tasks generate attack traffic against experiment-owned targets so
//! that detection and measurement pipelines have something to observe.

pub mod ftp_brute;

pub use ftp_brute::FtpBruteForce;
