//! Command-line interface
//!
//! Argument parsing for the `qwallet` diagnostic binary. Only commands that
//! work without key material are offered.

pub mod commands;

pub use commands::{Command, Opt};
