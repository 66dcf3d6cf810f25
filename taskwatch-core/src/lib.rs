//! Taskwatch Core
//!
//! Core types shared by the taskwatch crates.
//!
//! This crate contains:
//! - Domain types: remote task lifecycle (status, result, snapshot) and submitted jobs
//! - DTOs: request bodies sent to the remote scheduling service

pub mod domain;
pub mod dto;
