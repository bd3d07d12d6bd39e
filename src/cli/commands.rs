//! Interactive commands read from stdin while a session runs.

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send a heartbeat ping now
    Ping,
    /// Ask the server to close the room subscription
    Close,
    /// Close the session and exit
    Quit,
    Help,
    /// Print message counters
    Stats,
    Empty,
    Unknown(String),
}

/// Parse a line of input. Matching ignores case and surrounding whitespace.
pub fn parse_command(line: &str) -> Command {
    let command = line.trim().to_lowercase();
    match command.as_str() {
        "ping" => Command::Ping,
        "close" => Command::Close,
        "quit" | "exit" => Command::Quit,
        "help" => Command::Help,
        "stats" => Command::Stats,
        "" => Command::Empty,
        _ => Command::Unknown(command),
    }
}

/// Command list shown by `help` and at startup.
pub const COMMAND_HELP: &[(&str, &str)] = &[
    ("ping", "send a heartbeat ping"),
    ("close", "ask the server to close the room"),
    ("stats", "show message counters"),
    ("quit", "close the connection and exit"),
    ("help", "show this help"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(parse_command("ping"), Command::Ping);
        assert_eq!(parse_command("close"), Command::Close);
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("exit"), Command::Quit);
        assert_eq!(parse_command("help"), Command::Help);
        assert_eq!(parse_command("stats"), Command::Stats);
    }

    #[test]
    fn test_parse_is_case_and_space_insensitive() {
        assert_eq!(parse_command("  PING \n"), Command::Ping);
        assert_eq!(parse_command("Exit"), Command::Quit);
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(
            parse_command("Dance"),
            Command::Unknown("dance".to_string())
        );
    }

    #[test]
    fn test_help_lists_every_command() {
        let names: Vec<_> = COMMAND_HELP.iter().map(|(name, _)| *name).collect();
        for name in names {
            assert_ne!(parse_command(name), Command::Empty);
            assert!(!matches!(parse_command(name), Command::Unknown(_)));
        }
    }
}
