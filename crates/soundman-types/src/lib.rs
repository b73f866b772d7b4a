//! Foundation types for Sound Manager.
//!
//! Shared by every crate in the workspace: the error type and the shell
//! configuration loaded from TOML.

pub mod config;
pub mod error;
