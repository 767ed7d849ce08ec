//! Event classification
//!
//! Maps an upstream event type (`orders/create`, `checkouts/update`, ...)
//! onto the advertiser's conversion event names. Rules are checked in
//! table order and the first keyword contained in the event type wins.

use serde::{Deserialize, Serialize};

/// Canonical conversion event kinds understood by the advertiser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    AddToCart,
    InitiateCheckout,
    Purchase,
}

impl EventKind {
    /// Event name as sent to the conversion API
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AddToCart => "AddToCart",
            EventKind::InitiateCheckout => "InitiateCheckout",
            EventKind::Purchase => "Purchase",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword rules in priority order.
///
/// `order` precedes `checkout` and `cart` so that order topics carrying
/// checkout or cart tokens still classify as purchases.
pub const CLASSIFICATION_RULES: &[(&str, EventKind)] = &[
    ("order", EventKind::Purchase),
    ("checkout", EventKind::InitiateCheckout),
    ("cart", EventKind::AddToCart),
];

/// Classify an event type against [`CLASSIFICATION_RULES`]
pub fn classify(event_type: &str) -> Option<EventKind> {
    classify_with(CLASSIFICATION_RULES, event_type)
}

/// Classify against a caller-supplied rule table
pub fn classify_with(rules: &[(&str, EventKind)], event_type: &str) -> Option<EventKind> {
    rules
        .iter()
        .find(|(keyword, _)| event_type.contains(keyword))
        .map(|(_, kind)| *kind)
}
