//! Core domain types
//!
//! These types describe what the remote scheduling service reports about a job.
//! They are shared between the HTTP client (which decodes them) and the
//! watchdog (which compares consecutive snapshots).

pub mod job;
pub mod task;
