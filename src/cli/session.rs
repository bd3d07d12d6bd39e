//! Interactive session loop.
//!
//! Multiplexes stdin commands, SIGINT/SIGTERM and connection state changes
//! for one connected [`LiveClient`] until the user quits or the client
//! terminates.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::commands::{parse_command, Command};
use crate::cli_output::{icons, print_command_help, print_stats, print_status_line, state_line};
use crate::websocket::{ConnectionState, LiveClient};

/// Why the session loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// `quit` or `exit`
    Quit,
    /// SIGINT or SIGTERM
    Interrupted,
    /// stdin reached end of file
    InputClosed,
    /// Reconnect attempts ran out
    Terminated,
}

impl SessionOutcome {
    /// Process exit status for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            SessionOutcome::Terminated => 1,
            _ => 0,
        }
    }
}

/// Install a SIGINT/SIGTERM handler forwarding each signal into a channel.
pub fn interrupt_channel() -> Result<mpsc::UnboundedReceiver<()>, ctrlc::Error> {
    let (tx, rx) = mpsc::unbounded_channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })?;
    Ok(rx)
}

/// Run the interactive loop until quit, interrupt, end of input or
/// termination. Every exit path except termination closes the client.
pub async fn run_session<R>(
    client: Arc<LiveClient>,
    input: R,
    mut interrupts: mpsc::UnboundedReceiver<()>,
) -> SessionOutcome
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut state_rx = client.state_receiver();

    loop {
        tokio::select! {
            Some(()) = interrupts.recv() => {
                println!();
                print_status_line(icons::WARNING, "Interrupted, closing connection...");
                client.close().await;
                return SessionOutcome::Interrupted;
            }
            Ok(()) = state_rx.changed() => {
                let state = state_rx.borrow_and_update().clone();
                if client.is_closed() {
                    continue;
                }
                if let Some(line) = state_line(&state) {
                    println!("{}", line);
                }
                if state == ConnectionState::Terminated {
                    return SessionOutcome::Terminated;
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        debug!("stdin closed");
                        client.close().await;
                        return SessionOutcome::InputClosed;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin");
                        client.close().await;
                        return SessionOutcome::InputClosed;
                    }
                };
                if execute_command(&client, parse_command(&line)).await {
                    client.close().await;
                    return SessionOutcome::Quit;
                }
            }
        }
    }
}

/// Execute one command. Returns `true` when the session should end.
pub async fn execute_command(client: &LiveClient, command: Command) -> bool {
    match command {
        Command::Ping => {
            if let Err(e) = client.send_ping().await {
                print_status_line(icons::FAILURE, &format!("Ping failed: {}", e));
            }
        }
        Command::Close => {
            if let Err(e) = client.send_close_request().await {
                print_status_line(icons::FAILURE, &format!("Close request failed: {}", e));
            }
        }
        Command::Quit => {
            print_status_line(icons::SUCCESS, "Closing connection...");
            return true;
        }
        Command::Help => print_command_help(),
        Command::Stats => print_stats(&client.stats(), client.connection_duration().await),
        Command::Empty => {}
        Command::Unknown(input) => {
            print_status_line(
                icons::WARNING,
                &format!("Unknown command: {} (type 'help' for commands)", input),
            );
        }
    }
    false
}
