// Zenoh <-> serial bridge for a remote arm
//
// Usage: cargo run --bin braccio_bridge -- --port /dev/ttyACM0
use clap::Parser;
use tracing_subscriber::EnvFilter;

use braccio_runtime::config::{DEFAULT_BAUD_RATE, LINK_PORT};

#[derive(Debug, Parser)]
#[command(about = "Forward zenoh command lines to an arm on a serial port")]
struct Args {
    /// Serial port the arm controller listens on
    #[arg(long, default_value = LINK_PORT)]
    port: String,

    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();
    if let Err(e) = braccio_runtime::bridge::run(&args.port, args.baud).await {
        eprintln!("Bridge error: {}", e);
        std::process::exit(1);
    }
}
