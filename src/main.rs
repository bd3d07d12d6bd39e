use std::io;
use std::sync::Arc;

use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use tiklive::adapters::TungsteniteConnector;
use tiklive::cli::{
    handle_version_command, interrupt_channel, parse_args, run_session, CliCommand, RunArgs,
    USAGE,
};
use tiklive::cli_output::{icons, print_command_help, print_header, print_status_line};
use tiklive::config::ClientConfig;
use tiklive::display::ConsoleDisplay;
use tiklive::websocket::LiveClient;

fn init_tracing(debug: bool) {
    let default_directive = if debug { "tiklive=debug" } else { "tiklive=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Argument errors exit before any runtime or connection is set up
    let args = match parse_args(std::env::args()) {
        Ok(CliCommand::Version) => handle_version_command(),
        Ok(CliCommand::Help) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Ok(CliCommand::Run(args)) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    color_eyre::install()?;
    init_tracing(args.debug);

    let runtime = tokio::runtime::Runtime::new()?;
    let code = runtime.block_on(run(args))?;
    std::process::exit(code);
}

async fn run(args: RunArgs) -> Result<i32> {
    let mut config = ClientConfig::from_env(args.room_id);
    if let Some(server_url) = args.server_url {
        config = config.with_server_url(server_url);
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return Ok(1);
    }

    let client = LiveClient::new(
        config,
        Arc::new(TungsteniteConnector::new()),
        Arc::new(ConsoleDisplay::new()),
    );

    print_header(&format!("TIKLIVE ROOM {}", client.config().room_id));
    print_status_line(
        icons::WARNING,
        &format!("Connecting to {}", client.config().room_url()),
    );

    if let Err(e) = client.connect().await {
        print_status_line(icons::FAILURE, &format!("Connection failed: {}", e));
        return Ok(1);
    }
    print_status_line(icons::SUCCESS, "Connected");
    println!();
    print_command_help();

    let interrupts = interrupt_channel()?;
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let outcome = run_session(client, stdin, interrupts).await;

    Ok(outcome.exit_code())
}
