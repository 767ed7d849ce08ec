//! Webhook route handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use relay_core::{translate, Notification, RelayError, RelayResult, SkipReason};

use crate::delivery::DeliveryOutcome;
use crate::ProxyState;

/// Header carrying the event type when the body has none
pub const TOPIC_HEADER: &str = "x-shopify-topic";

/// Create the proxy router
pub fn create_router(state: Arc<ProxyState>) -> Router {
    let webhook = post(receive_webhook).fallback(method_not_allowed);

    Router::new()
        .route("/health", get(health))
        .route("/webhook", webhook.clone())
        .route("/api/tiktok-webhook", webhook)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "relay-proxy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Webhook response
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    /// Whether the conversion API accepted an event for this webhook
    pub event_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryOutcome>,
}

impl WebhookResponse {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            success: true,
            event_sent: false,
            event: None,
            event_id: None,
            value: None,
            skipped: Some(reason),
            delivery: None,
        }
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

/// Outer error boundary for the webhook handler
struct ApiError(RelayError);

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let (error, detail) = match &self.0 {
            RelayError::MalformedBody { reason } => {
                ("Invalid JSON body".to_string(), Some(reason.clone()))
            }
            other => (other.to_string(), None),
        };

        if self.0.is_caller_error() {
            tracing::warn!(code = self.0.code(), error = %self.0, "Rejected webhook");
        } else {
            tracing::error!(code = self.0.code(), error = %self.0, "Webhook processing failed");
        }

        (
            status,
            Json(ErrorResponse {
                error,
                code: self.0.code().to_string(),
                detail,
            }),
        )
            .into_response()
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: "Method not allowed".to_string(),
            code: "METHOD_NOT_ALLOWED".to_string(),
            detail: None,
        }),
    )
        .into_response()
}

/// Receive a commerce webhook and relay any matching conversion event
async fn receive_webhook(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let notification = parse_notification(&body)?;
    let topic = headers.get(TOPIC_HEADER).and_then(|v| v.to_str().ok());

    tracing::info!(
        event_type = notification.event_type(topic).unwrap_or("<none>"),
        "Webhook received"
    );

    let event = match translate(&notification, topic) {
        Ok(event) => event,
        Err(reason) => {
            tracing::info!(reason = reason.as_str(), "No conversion event for webhook");
            return Ok(Json(WebhookResponse::skipped(reason)));
        }
    };

    let outcome = state.delivery.deliver(&event).await;

    Ok(Json(WebhookResponse {
        success: true,
        event_sent: outcome.is_delivered(),
        event: Some(event.kind.as_str()),
        event_id: Some(event.id),
        value: Some(event.value),
        skipped: None,
        delivery: Some(outcome),
    }))
}

/// Only a body that is not JSON at all is rejected; any JSON value is
/// read leniently.
fn parse_notification(body: &[u8]) -> RelayResult<Notification> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| RelayError::MalformedBody {
            reason: e.to_string(),
        })?;
    Ok(Notification::from_json(value))
}
