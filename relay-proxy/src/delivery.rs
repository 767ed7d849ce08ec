//! Conversion API delivery
//!
//! [`DeliveryClient::deliver`] is the inner error boundary: every failure
//! (missing secrets, network, rejection) is logged and returned as a
//! [`DeliveryOutcome`], never as an error. The webhook response does not
//! depend on it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use relay_core::{ConversionEvent, RelayError, RelayResult, TrackPayload};

use crate::config::AdvertiserConfig;

/// Successful answer from the conversion API
#[derive(Debug, Clone, Serialize)]
pub struct SinkResponse {
    pub status: u16,
    pub body: Value,
}

/// Destination for conversion payloads
#[async_trait]
pub trait ConversionSink: Send + Sync {
    /// Sink name for logs
    fn name(&self) -> &str;

    /// Send one payload. Exactly one attempt; no retries.
    async fn send(&self, access_token: &str, payload: &TrackPayload) -> RelayResult<SinkResponse>;
}

/// HTTP sink posting to the conversion tracking endpoint
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> RelayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| RelayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ConversionSink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, access_token: &str, payload: &TrackPayload) -> RelayResult<SinkResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Access-Token", access_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(RelayError::Rejected { status, body: text });
        }

        let body = serde_json::from_str(&text).unwrap_or(Value::String(text.clone()));

        // The API reports business errors as 200 with a non-zero `code`
        match body.get("code").and_then(Value::as_i64) {
            Some(code) if code != 0 => Err(RelayError::Rejected { status, body: text }),
            _ => Ok(SinkResponse { status, body }),
        }
    }
}

/// Result of one delivery attempt, for logging and the webhook response
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered { http_status: u16, response: Value },
    Failed { code: String, message: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Builds payloads and hands them to a [`ConversionSink`]
#[derive(Clone)]
pub struct DeliveryClient {
    sink: Arc<dyn ConversionSink>,
    advertiser: AdvertiserConfig,
}

impl DeliveryClient {
    pub fn new(sink: Arc<dyn ConversionSink>, advertiser: AdvertiserConfig) -> Self {
        Self { sink, advertiser }
    }

    /// Deliver an event, logging the outcome. Never fails.
    pub async fn deliver(&self, event: &ConversionEvent) -> DeliveryOutcome {
        tracing::info!(
            event = %event.kind,
            event_id = %event.id,
            value = event.value,
            currency = %event.currency,
            sink = self.sink.name(),
            "Sending conversion event"
        );

        match self.try_deliver(event).await {
            Ok(response) => {
                tracing::info!(
                    event_id = %event.id,
                    status = response.status,
                    response = %response.body,
                    "Conversion API response"
                );
                DeliveryOutcome::Delivered {
                    http_status: response.status,
                    response: response.body,
                }
            }
            Err(e) => {
                tracing::error!(
                    event_id = %event.id,
                    code = e.code(),
                    error = %e,
                    "Conversion delivery failed"
                );
                DeliveryOutcome::Failed {
                    code: e.code().to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    async fn try_deliver(&self, event: &ConversionEvent) -> RelayResult<SinkResponse> {
        let creds = self.advertiser.credentials()?;
        let payload = TrackPayload::build(event, &creds.pixel_code, Utc::now());
        self.sink.send(&creds.access_token, &payload).await
    }
}
