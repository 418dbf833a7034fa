use clap::Parser;
use tracing_subscriber::EnvFilter;

use braccio_runtime::runtime::RuntimeArgs;

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with_writer(std::io::stderr) // stdout may be the command link
        .init();

    let args = RuntimeArgs::parse();
    if let Err(e) = braccio_runtime::runtime::run(args).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}
