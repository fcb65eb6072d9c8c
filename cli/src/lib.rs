//! Command-line surface of the component framework.
//!
//! The host binary registers its component types and hands the registries to [`cli::CliControl`],
//! which parses the arguments, runs the requested command and turns every fatal error into an
//! exit status.

pub mod cli;

pub use cli::{Cli, CliControl, CliError, Command};
