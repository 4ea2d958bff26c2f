//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command execution with error handling
//! - `io` - File I/O with consistent error handling
//! - `template` - String template rendering

pub mod command;
pub mod io;
pub mod template;
