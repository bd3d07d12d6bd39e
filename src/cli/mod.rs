//! CLI module for tiklive.
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing
//! - Version display
//! - Interactive commands and the session loop
//!
//! # Usage
//!
//! ```ignore
//! use tiklive::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args())? {
//!     CliCommand::Version => handle_version_command(),
//!     CliCommand::Help => println!("{}", USAGE),
//!     CliCommand::Run(args) => { /* connect and run_session */ }
//! }
//! ```

pub mod args;
pub mod commands;
pub mod session;
pub mod version;

pub use args::{parse_args, ArgsError, CliCommand, RunArgs, USAGE};
pub use commands::{parse_command, Command};
pub use session::{interrupt_channel, run_session, SessionOutcome};
pub use version::{handle_version_command, VERSION};
