//! r700-emu - network-attached RFID reader emulator
//!
//! This is the main entry point for the emulator binary.
//!
//! Usage:
//!   cargo run -- --host 0.0.0.0 --port 8080 --data-dir ./data

use clap::Parser;
use r700_emu::http::start_server;
use r700_emu::mqtt::MqttPublisher;
use r700_emu::state::ReaderState;
use r700_emu::webhook::WebhookSink;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "r700-emu")]
#[command(about = "Network-attached RFID reader emulator", long_about = None)]
struct Args {
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Directory holding the settings document and reference-list files
    #[arg(short, long, default_value = "./data")]
    data_dir: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let state = Arc::new(ReaderState::new(&args.data_dir)?);
    info!("Loaded settings from {}", args.data_dir);

    // Singleton batch delivery loop, alive for the whole process
    tokio::spawn(WebhookSink::new(Arc::clone(&state)).run());

    // Resume the broker publisher for a persisted active configuration
    MqttPublisher::respawn(&state);

    let addr = format!("{}:{}", args.host, args.port);

    let shutdown_signal = async {
        tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C signal handler");
        info!("Shutdown signal received, stopping server...");
    };

    tokio::select! {
        result = start_server(&addr, Arc::clone(&state)) => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal => {
            state.stop_session();
            info!("Server shut down gracefully");
        }
    }

    Ok(())
}
