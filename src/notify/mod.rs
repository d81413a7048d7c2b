//! Output for the command-line tool.
//!
//! This module handles:
//! - Colored console output (with ASCII fallbacks)
//! - JSON output formatting

pub mod console;

pub use console::ConsoleOutput;
