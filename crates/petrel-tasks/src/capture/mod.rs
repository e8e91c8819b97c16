//! Packet-capture tasks.
//!
//! Start tasks launch the capture tool in the background and record its
//! process id; the matching stop tasks take the producing step's name and
//! retrieve that pid through the step result store.

pub mod tcpdump;
pub mod tshark;
