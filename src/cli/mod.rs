//! CLI command implementations
//!
//! This module contains all CLI command handlers, organized by category:
//! - `simple`: Descriptor commands (compile, render, check)
//! - `config`: Configuration and schema commands
//! - `util`: Shared utility functions

pub mod config;
pub mod simple;
pub mod util;

// Re-export all command functions for convenient access
pub use config::{cmd_config, cmd_schema};
pub use simple::{cmd_check, cmd_compile, cmd_render};
