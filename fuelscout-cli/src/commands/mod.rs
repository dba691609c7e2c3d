//! CLI command implementations.

pub mod common;
pub mod config;
pub mod follow;
pub mod search;
