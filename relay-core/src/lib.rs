//! Relay Core - commerce webhook to conversion event translation
//!
//! A synchronous, stateless pipeline. Each webhook flows left to right:
//!
//! ```text
//! Notification ─► classify ─► extract_value ─► map_contents ─► hash PII ─► TrackPayload
//! ```
//!
//! No I/O happens here; delivery lives in `relay-proxy`.
//!
//! # Example
//!
//! ```rust
//! use relay_core::{translate, EventKind, Notification};
//!
//! let notification: Notification = serde_json::from_str(
//!     r#"{"event": "orders/create", "total_price": 2599}"#,
//! ).unwrap();
//!
//! let event = translate(&notification, None).unwrap();
//! assert_eq!(event.kind, EventKind::Purchase);
//! assert_eq!(event.value, 25.99);
//! assert_eq!(event.currency, "USD");
//! ```

pub mod classify;
pub mod content;
pub mod error;
pub mod event;
pub mod notification;
pub mod payload;
pub mod pii;
pub mod value;

pub use classify::{classify, EventKind, CLASSIFICATION_RULES};
pub use content::{map_contents, Content};
pub use error::{RelayError, RelayResult};
pub use event::{new_event_id, translate, ConversionEvent, Identity, SkipReason};
pub use notification::{Amount, LineItem, Notification};
pub use payload::{format_timestamp, TrackPayload};
pub use pii::{hash_email, hash_phone};
pub use value::{extract_value, resolve_currency, DEFAULT_CURRENCY};
