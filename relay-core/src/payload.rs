//! Conversion API request body
//!
//! Field names follow the advertiser's pixel tracking schema. Optional
//! fields are omitted rather than sent as `null`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Content;
use crate::event::ConversionEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPayload {
    pub pixel_code: String,
    pub event: String,
    pub event_id: String,
    /// RFC 3339, UTC, whole seconds
    pub timestamp: String,
    pub properties: Properties,
    pub context: Context,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub value: f64,
    pub currency: String,
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad: Option<AdContext>,
    pub user: UserContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdContext {
    pub callback: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    /// SHA-256 of the normalised email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// SHA-256 of the digits-only phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Timestamp in the format the conversion API expects
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl TrackPayload {
    pub fn build(event: &ConversionEvent, pixel_code: &str, at: DateTime<Utc>) -> Self {
        let identity = &event.identity;
        Self {
            pixel_code: pixel_code.to_string(),
            event: event.kind.as_str().to_string(),
            event_id: event.id.clone(),
            timestamp: format_timestamp(at),
            properties: Properties {
                value: event.value,
                currency: event.currency.clone(),
                contents: event.contents.clone(),
            },
            context: Context {
                ad: event.callback.clone().map(|callback| AdContext { callback }),
                user: UserContext {
                    email: identity.email_sha256.clone(),
                    phone: identity.phone_sha256.clone(),
                },
                ip: identity.ip.clone(),
                user_agent: identity.user_agent.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::EventKind;
    use crate::event::Identity;
    use chrono::TimeZone;
    use serde_json::json;

    fn event() -> ConversionEvent {
        ConversionEvent {
            kind: EventKind::Purchase,
            id: "shopify_abc".to_string(),
            value: 50.0,
            currency: "EUR".to_string(),
            contents: vec![Content {
                content_id: Some("111".to_string()),
                quantity: Some(json!(2)),
                price: "25.00".to_string(),
            }],
            identity: Identity {
                email_sha256: Some("e".repeat(64)),
                phone_sha256: None,
                ip: Some("203.0.113.9".to_string()),
                user_agent: None,
            },
            callback: None,
        }
    }

    #[test]
    fn test_timestamp_whole_seconds() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(789);
        assert_eq!(format_timestamp(at), "2024-03-01T12:30:45Z");
    }

    #[test]
    fn test_payload_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
        let payload = TrackPayload::build(&event(), "PIXEL1", at);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "pixel_code": "PIXEL1",
                "event": "Purchase",
                "event_id": "shopify_abc",
                "timestamp": "2024-03-01T12:30:45Z",
                "properties": {
                    "value": 50.0,
                    "currency": "EUR",
                    "contents": [{"content_id": "111", "quantity": 2, "price": "25.00"}]
                },
                "context": {
                    "user": {"email": "e".repeat(64)},
                    "ip": "203.0.113.9"
                }
            })
        );
    }

    #[test]
    fn test_callback_forwarded() {
        let mut event = event();
        event.callback = Some("E.C.P.clickid".to_string());
        let payload = TrackPayload::build(&event, "PIXEL1", Utc::now());

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["context"]["ad"]["callback"], "E.C.P.clickid");
    }
}
