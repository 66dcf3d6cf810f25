//! Data transfer objects
//!
//! Request bodies sent to the remote scheduling service.

pub mod job;
