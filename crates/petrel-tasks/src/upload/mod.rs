//! Getting files off the node.

pub mod fileio;
pub mod ftp;

pub use ftp::{RetrieveFromFtp, UploadToFtp};
