//! Command-line argument parsing for the tiklive CLI.
//!
//! This module handles parsing command-line arguments and determining
//! which CLI command to execute.

use thiserror::Error;

/// Argument errors. All of them exit non-zero before any connection attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgsError {
    #[error("Please provide a room id")]
    MissingRoomId,

    #[error("Invalid room id: {0} (must be numeric)")]
    InvalidRoomId(String),

    #[error("Option {0} requires a value")]
    MissingValue(&'static str),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),
}

/// Options for a room session.
#[derive(Debug, Clone, PartialEq)]
pub struct RunArgs {
    pub room_id: String,
    /// Overrides the configured relay server
    pub server_url: Option<String>,
    /// Raise the default log level to debug
    pub debug: bool,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Connect to a room (default)
    Run(RunArgs),
}

/// Usage text printed for `--help` and argument errors.
pub const USAGE: &str = "\
Usage: tiklive [OPTIONS] <ROOM_ID>

Arguments:
  <ROOM_ID>          Numeric live room id, e.g. 7514168917980400426

Options:
  --server <URL>     Relay server (default: $TIKLIVE_SERVER_URL or ws://localhost:8000)
  --debug            Verbose logging
  -V, --version      Print version
  -h, --help         Print help";

/// Parse command-line arguments and return the appropriate command.
///
/// # Arguments
///
/// * `args` - Iterator of command-line arguments (typically `std::env::args()`)
///
/// # Examples
///
/// ```
/// use tiklive::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["tiklive".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut room_id = None;
    let mut server_url = None;
    let mut debug = false;

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--debug" => debug = true,
            "--server" => {
                server_url = Some(args.next().ok_or(ArgsError::MissingValue("--server"))?);
            }
            other if other.starts_with("--server=") => {
                server_url = Some(other["--server=".len()..].to_string());
            }
            other if other.starts_with('-') => {
                return Err(ArgsError::UnexpectedArgument(other.to_string()));
            }
            _ if room_id.is_some() => return Err(ArgsError::UnexpectedArgument(arg)),
            _ => room_id = Some(arg),
        }
    }

    let room_id = room_id.ok_or(ArgsError::MissingRoomId)?;
    validate_room_id(&room_id)?;

    Ok(CliCommand::Run(RunArgs {
        room_id,
        server_url,
        debug,
    }))
}

/// Room ids are non-empty strings of ASCII digits.
pub fn validate_room_id(room_id: &str) -> Result<(), ArgsError> {
    if !room_id.is_empty() && room_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ArgsError::InvalidRoomId(room_id.to_string()))
    }
}
