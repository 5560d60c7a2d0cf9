//! Command-line interface.

pub mod commands;
pub mod parser;

pub use parser::{Cli, Command};
