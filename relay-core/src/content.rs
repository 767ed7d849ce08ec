//! Line items to advertiser content descriptors

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::notification::LineItem;
use crate::value::format_major;

/// One entry of `properties.contents`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    /// Passed through as the platform sent it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    /// Unit price in major units, two decimals
    pub price: String,
}

impl From<&LineItem> for Content {
    fn from(item: &LineItem) -> Self {
        Self {
            content_id: item.product_id.as_ref().map(ToString::to_string),
            quantity: item.quantity.clone(),
            price: format_major(
                item.price
                    .as_ref()
                    .and_then(|p| p.minor_units())
                    .unwrap_or(0.0),
            ),
        }
    }
}

/// Map line items in order; an absent list maps to an empty one
pub fn map_contents(line_items: Option<&[LineItem]>) -> Vec<Content> {
    line_items
        .unwrap_or_default()
        .iter()
        .map(Content::from)
        .collect()
}
