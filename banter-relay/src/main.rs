//! Banter Relay Server
//!
//! Binary entry point: reads configuration from the environment, binds
//! the listener, and runs the accept loop forever.

use tokio::net::TcpListener;
use tracing::info;

use banter_relay::config::RelayConfig;
use banter_relay::server;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("banter_relay=info".parse().unwrap()),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env();
    info!(
        "Starting Banter Relay Server v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Listening on {}", config.listen_addr);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .expect("Failed to bind listen address");

    server::serve(listener, config).await;
}
