//! Relay Proxy - commerce webhooks to the conversion API
//!
//! Receives cart, checkout and order webhooks, translates them with
//! `relay-core`, and forwards one conversion event per webhook.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐      ┌──────────────────────┐      ┌────────────────┐
//! │  Commerce   │──────│   Relay Proxy        │──────│ Conversion API │
//! │  Platform   │ HTTP │                      │ HTTP │                │
//! └─────────────┘      │  1. Parse body       │      └────────────────┘
//!                      │  2. Classify + value │
//!                      │  3. Hash identity    │
//!                      │  4. Deliver + log    │
//!                      └──────────────────────┘
//! ```
//!
//! The upstream platform always gets a 200 for a well-formed body, whether
//! or not delivery succeeded, so it never retries because of the
//! advertising side.
//!
//! ## Usage
//!
//! ```text
//! POST http://relay-proxy:8422/webhook
//! X-Shopify-Topic: orders/create
//! Content-Type: application/json
//!
//! {"event": "orders/create", "total_price": 5000, "currency": "EUR", ...}
//! ```

pub mod config;
pub mod delivery;
pub mod webhook;

pub use config::{AdvertiserConfig, ProxyConfig, ProxyConfigBuilder};
pub use delivery::{ConversionSink, DeliveryClient, DeliveryOutcome, HttpSink, SinkResponse};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use relay_core::RelayResult;

/// Shared proxy state; immutable after startup
pub struct ProxyState {
    pub delivery: DeliveryClient,
    pub config: ProxyConfig,
}

impl ProxyState {
    pub fn new(config: ProxyConfig, sink: Arc<dyn ConversionSink>) -> Self {
        Self {
            delivery: DeliveryClient::new(sink, config.advertiser.clone()),
            config,
        }
    }
}

/// Relay webhook proxy
pub struct RelayProxy {
    state: Arc<ProxyState>,
}

impl RelayProxy {
    /// Create a proxy delivering over HTTP to the configured endpoint
    pub fn new(config: ProxyConfig) -> RelayResult<Self> {
        let sink = HttpSink::new(config.endpoint.clone(), config.timeout_ms)?;
        Ok(Self::with_sink(config, Arc::new(sink)))
    }

    /// Create a proxy with a custom sink
    pub fn with_sink(config: ProxyConfig, sink: Arc<dyn ConversionSink>) -> Self {
        Self {
            state: Arc::new(ProxyState::new(config, sink)),
        }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        webhook::create_router(Arc::clone(&self.state))
    }

    /// Get the socket address
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.state.config.port))
    }

    /// Run the proxy
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();
        let addr = self.addr();

        tracing::info!("Relay Proxy listening on http://{}", addr);
        tracing::info!("Endpoints:");
        tracing::info!("  POST /webhook             - Relay commerce webhook");
        tracing::info!("  POST /api/tiktok-webhook  - Alias of /webhook");
        tracing::info!("  GET  /health              - Health check");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
