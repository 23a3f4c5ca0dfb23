//! Top-level wiring: configuration, pre-flight probe, terminal setup and the
//! session loop, with teardown in the reverse order of setup.

use tracing::{error, info};

use crate::cli::Cli;
use crate::client::input::InputListener;
use crate::client::surface::StdoutSurface;
use crate::config::ClientConfig;
use crate::error::CliError;
use crate::session::{Session, health};
use crate::telemetry::logging;
use crate::transport::WebSocketTransport;

pub async fn run(cli: Cli) -> Result<(), CliError> {
    logging::init(&cli.logging.to_config()).map_err(|err| CliError::Logging(err.to_string()))?;

    let config = ClientConfig::from_cli(&cli)?;
    info!(server = %config.base_url(), "starting shore client");

    if let Err(err) = health::probe(&config.health_url(), config.probe_timeout).await {
        error!(error = %err, "health probe failed");
        print_unreachable_banner(&config);
        return Err(err.into());
    }

    println!("Connecting to {}...", config.base_url());

    let (transport_tx, mut transport_events) = tokio::sync::mpsc::unbounded_channel();
    let (host_tx, mut host_events) = tokio::sync::mpsc::unbounded_channel();

    let transport =
        WebSocketTransport::new(config.websocket_url(), config.retry, transport_tx);
    let surface = StdoutSurface::new()?;
    let mut listener = InputListener::spawn(host_tx);

    let mut session = Session::new(transport, surface, config);
    session.connect();
    let result = session.run(&mut transport_events, &mut host_events).await;

    // Stop feeding input before the socket closes, and close the socket
    // before the surface drop restores the cooked terminal.
    listener.stop();
    session.shutdown().await;
    drop(session);

    println!("\nSession closed.");
    result?;
    Ok(())
}

fn print_unreachable_banner(config: &ClientConfig) {
    eprintln!("\x1b[31mERROR: Terminal server is not running!\x1b[0m");
    eprintln!();
    eprintln!("No healthy server at {}", config.health_url());
    eprintln!("Start the server, or point --server at a running instance.");
}
