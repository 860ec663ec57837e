//! Foundation types for shelltutor.
//!
//! Shared by every crate in the workspace: the error taxonomy and the
//! TOML-backed configuration.

pub mod config;
pub mod error;
