//! Canonical conversion event
//!
//! Built once per webhook from a [`Notification`], and only when both the
//! event kind and a positive value resolve. Everything else is a skip,
//! which is not an error.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::{classify, EventKind};
use crate::content::{map_contents, Content};
use crate::notification::Notification;
use crate::pii::{hash_email, hash_phone};
use crate::value::{extract_value, line_items_value, resolve_currency};

/// Why a notification produced no conversion event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Neither the body nor the topic header named an event type
    MissingEventType,
    /// The event type matched no classification rule
    UnrecognizedEvent,
    /// No positive value: the total was absent, non-numeric, or not
    /// positive, and for carts the line items summed to nothing
    MissingValue,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingEventType => "missing_event_type",
            SkipReason::UnrecognizedEvent => "unrecognized_event",
            SkipReason::MissingValue => "missing_value",
        }
    }
}

/// Hashed and raw identity signals for user matching
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub email_sha256: Option<String>,
    pub phone_sha256: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl Identity {
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            email_sha256: hash_email(notification.email()),
            phone_sha256: hash_phone(notification.phone()),
            ip: non_empty(notification.browser_ip()),
            user_agent: non_empty(notification.user_agent()),
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// A conversion event ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionEvent {
    pub kind: EventKind,
    /// Fresh per event; lets the advertiser discard exact replays
    pub id: String,
    /// Major currency units
    pub value: f64,
    pub currency: String,
    pub contents: Vec<Content>,
    pub identity: Identity,
    /// Ad click identifier forwarded as the callback
    pub callback: Option<String>,
}

/// Generate a new event identifier
pub fn new_event_id() -> String {
    format!("shopify_{}", Uuid::new_v4().simple())
}

/// Translate a notification into a conversion event.
///
/// `topic_header` is used when the body carries no `event` field.
pub fn translate(
    notification: &Notification,
    topic_header: Option<&str>,
) -> Result<ConversionEvent, SkipReason> {
    let event_type = notification
        .event_type(topic_header)
        .ok_or(SkipReason::MissingEventType)?;
    let kind = classify(event_type).ok_or(SkipReason::UnrecognizedEvent)?;
    let value = extract_value(notification.total_price.as_ref())
        .or_else(|| match kind {
            // Cart webhooks usually carry no total
            EventKind::AddToCart => line_items_value(notification.line_items.as_deref()),
            _ => None,
        })
        .ok_or(SkipReason::MissingValue)?;

    Ok(ConversionEvent {
        kind,
        id: new_event_id(),
        value,
        currency: resolve_currency(notification.currency.as_deref()),
        contents: map_contents(notification.line_items.as_deref()),
        identity: Identity::from_notification(notification),
        callback: non_empty(notification.ttclid.as_deref()),
    })
}

impl ConversionEvent {
    /// [`translate`] without the skip reason
    pub fn from_notification(
        notification: &Notification,
        topic_header: Option<&str>,
    ) -> Option<Self> {
        translate(notification, topic_header).ok()
    }
}
