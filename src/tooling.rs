//! Tooling
//!
//! Command-line front end over the library; the `poppel` binary is a thin
//! wrapper around [`cli::CliContext`].

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
