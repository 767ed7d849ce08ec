//! Relay Proxy Binary
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults (port 8422)
//! TIKTOK_PIXEL_ID=... TIKTOK_ACCESS_TOKEN=... relay-proxy
//!
//! # Custom port and outbound timeout
//! RELAY_PORT=9000 RELAY_TIMEOUT_MS=5000 relay-proxy
//! ```

use relay_proxy::{ProxyConfig, RelayProxy};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_proxy=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ProxyConfig::from_env();

    tracing::info!("Starting Relay Proxy v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Conversion endpoint: {}", config.endpoint);
    for key in config.advertiser.missing_keys() {
        tracing::warn!(key, "Advertiser secret not set; conversion events will not be delivered");
    }

    let proxy = RelayProxy::new(config)?;
    proxy.run().await?;

    Ok(())
}
