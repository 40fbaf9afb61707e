//! # OntoView
//!
//! Command-line host for `ontoview-core`.
//!
//! - [`cli`]: argument parsing and command execution
//! - [`config`]: TOML configuration file

pub mod cli;
pub mod config;
