//! Simple line-based CLI output utilities.

use std::time::Duration;

use crate::cli::commands::COMMAND_HELP;
use crate::websocket::{ConnectionState, StatsSnapshot};

/// Line width for separators.
const LINE_WIDTH: usize = 60;

/// Print the main header.
///
/// ```text
/// TIKLIVE ROOM 7514168917980400426
/// ════════════════════════════════════════════════════════════
/// ```
pub fn print_header(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "═".repeat(LINE_WIDTH));
    println!();
}

/// Print a line with a leading status icon.
///
/// ```text
///   ✓ Connected to ws://localhost:8000/ws/123
/// ```
pub fn print_status_line(icon: &str, message: &str) {
    println!("  {} {}", icon, message);
}

/// Print the interactive command list.
///
/// ```text
/// COMMANDS
/// ────────────────────────────────────────────────────────────
///   ping     send a heartbeat ping
///   ...
/// ```
pub fn print_command_help() {
    println!("COMMANDS");
    println!("{}", "─".repeat(LINE_WIDTH));
    for (name, description) in COMMAND_HELP {
        println!("  {:<8} {}", name, description);
    }
    println!();
}

/// Print session counters.
pub fn print_stats(stats: &StatsSnapshot, connected_for: Option<Duration>) {
    println!("STATS");
    println!("{}", "─".repeat(LINE_WIDTH));
    for line in stats_lines(stats, connected_for) {
        println!("  {}", line);
    }
    println!();
}

/// Lines shown by [`print_stats`].
pub fn stats_lines(stats: &StatsSnapshot, connected_for: Option<Duration>) -> Vec<String> {
    let connected = match connected_for {
        Some(duration) => format_duration(duration),
        None => "not connected".to_string(),
    };
    vec![
        format!("Connected for: {}", connected),
        format!("Messages:      {}", stats.total_messages()),
        format!("  status       {}", stats.status_messages),
        format!("  pong         {}", stats.pong_messages),
        format!("  activity     {}", stats.activity_messages),
        format!("  gift         {}", stats.gift_messages),
        format!("  error        {}", stats.error_messages),
        format!("  other        {}", stats.other_messages),
        format!("Malformed:     {}", stats.malformed_messages),
        format!("Pings sent:    {}", stats.pings_sent),
    ]
}

/// Format a duration as `1h 02m 03s`, `2m 03s` or `3s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// One-line description of a state transition, if it is worth showing.
pub fn state_line(state: &ConnectionState) -> Option<String> {
    match state {
        ConnectionState::Connected => Some(format!("{} Connected", icons::SUCCESS)),
        ConnectionState::Disconnected => Some(format!("{} Disconnected", icons::WARNING)),
        ConnectionState::Reconnecting { attempt } => {
            Some(format!("{} Reconnecting (attempt {})", icons::WARNING, attempt))
        }
        ConnectionState::Terminated => Some(format!(
            "{} Could not reconnect, session terminated",
            icons::FAILURE
        )),
        ConnectionState::Connecting | ConnectionState::Closing => None,
    }
}

/// Status icons
pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const FAILURE: &str = "✗";
    pub const WARNING: &str = "⚠";
}
