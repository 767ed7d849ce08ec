//! Inbound commerce platform notification
//!
//! The shape is owned by the upstream platform, so deserialisation is
//! lenient: unknown fields are ignored and numeric fields accept the
//! several encodings platforms emit.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a field as `T`, treating a value of the wrong type as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => Ok(serde_json::from_value(value).ok()),
    }
}

/// Line items; entries that are not objects become empty items
fn lenient_items<'de, D>(deserializer: D) -> Result<Option<Vec<LineItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// A webhook notification as received from the commerce platform
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notification {
    /// Event type, e.g. `orders/create`
    #[serde(default, deserialize_with = "lenient")]
    pub event: Option<String>,
    /// Order or checkout total in minor currency units
    #[serde(default, deserialize_with = "lenient")]
    pub total_price: Option<Amount>,
    #[serde(default, deserialize_with = "lenient")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub line_items: Option<Vec<LineItem>>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer: Option<Customer>,
    #[serde(default, deserialize_with = "lenient")]
    pub client_details: Option<ClientDetails>,
    /// Ad click identifier captured by the storefront, if any
    #[serde(default, deserialize_with = "lenient")]
    pub ttclid: Option<String>,
}

impl Notification {
    /// Build from any JSON value. Never fails; a non-object is an empty
    /// notification.
    pub fn from_json(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Event type from the body, or the topic header when the body has none
    pub fn event_type<'a>(&'a self, topic_header: Option<&'a str>) -> Option<&'a str> {
        self.event
            .as_deref()
            .filter(|e| !e.is_empty())
            .or(topic_header.filter(|t| !t.is_empty()))
    }

    pub fn email(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.email.as_deref())
    }

    pub fn phone(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.phone.as_deref())
    }

    pub fn browser_ip(&self) -> Option<&str> {
        self.client_details.as_ref().and_then(|c| c.browser_ip.as_deref())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.client_details.as_ref().and_then(|c| c.user_agent.as_deref())
    }
}

/// A single cart, checkout, or order line
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "lenient")]
    pub product_id: Option<ProductId>,
    /// Quantity exactly as the platform sent it
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: Option<Value>,
    /// Unit price in minor currency units
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Amount>,
}

impl LineItem {
    /// Numeric quantity, from a JSON number or numeric string
    pub fn quantity_units(&self) -> Option<f64> {
        let quantity = match self.quantity.as_ref()? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        quantity.is_finite().then_some(quantity)
    }

    /// `price * quantity` in minor units; zero when either is unusable
    pub fn line_total(&self) -> f64 {
        let price = self.price.as_ref().and_then(Amount::minor_units);
        match (price, self.quantity_units()) {
            (Some(price), Some(quantity)) => price * quantity,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientDetails {
    #[serde(default, deserialize_with = "lenient")]
    pub browser_ip: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub user_agent: Option<String>,
}

/// Monetary amount in minor units, however the platform encoded it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Integer(i64),
    Decimal(f64),
    Text(String),
    /// Anything else (objects, booleans); never a usable number
    Other(Value),
}

impl Amount {
    /// Numeric value in minor units, if the encoding holds a finite number
    pub fn minor_units(&self) -> Option<f64> {
        let minor = match self {
            Amount::Integer(n) => *n as f64,
            Amount::Decimal(n) => *n,
            Amount::Text(s) => s.trim().parse::<f64>().ok()?,
            Amount::Other(_) => return None,
        };
        minor.is_finite().then_some(minor)
    }
}

impl From<i64> for Amount {
    fn from(n: i64) -> Self {
        Amount::Integer(n)
    }
}

/// Product identifier; platforms send either numbers or strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_notification() {
        let n: Notification = serde_json::from_value(json!({
            "event": "orders/create",
            "total_price": 5000,
            "currency": "EUR",
            "line_items": [{"product_id": 111, "quantity": 2, "price": 2500}],
            "customer": {"email": "a@b.com", "phone": "+1 555"},
            "client_details": {"browser_ip": "1.2.3.4", "user_agent": "UA"},
            "shop_domain": "ignored.example"
        }))
        .unwrap();

        assert_eq!(n.event.as_deref(), Some("orders/create"));
        assert_eq!(n.total_price, Some(Amount::Integer(5000)));
        assert_eq!(n.email(), Some("a@b.com"));
        assert_eq!(n.phone(), Some("+1 555"));
        assert_eq!(n.browser_ip(), Some("1.2.3.4"));
        assert_eq!(n.user_agent(), Some("UA"));

        let items = n.line_items.unwrap();
        assert_eq!(items[0].product_id.as_ref().unwrap().to_string(), "111");
        assert_eq!(items[0].quantity, Some(json!(2)));
    }

    #[test]
    fn test_amount_encodings() {
        let n: Notification = serde_json::from_value(json!({"total_price": "2599"})).unwrap();
        assert_eq!(n.total_price.unwrap().minor_units(), Some(2599.0));

        let n: Notification = serde_json::from_value(json!({"total_price": 12.5})).unwrap();
        assert_eq!(n.total_price.unwrap().minor_units(), Some(12.5));

        let n: Notification = serde_json::from_value(json!({"total_price": {"amount": 1}})).unwrap();
        assert_eq!(n.total_price.unwrap().minor_units(), None);

        let n: Notification = serde_json::from_value(json!({"total_price": null})).unwrap();
        assert!(n.total_price.is_none());
    }

    #[test]
    fn test_event_type_falls_back_to_topic_header() {
        let n = Notification::default();
        assert_eq!(n.event_type(Some("carts/update")), Some("carts/update"));
        assert_eq!(n.event_type(None), None);

        let n = Notification {
            event: Some("orders/create".to_string()),
            ..Default::default()
        };
        assert_eq!(n.event_type(Some("carts/update")), Some("orders/create"));
    }

    #[test]
    fn test_string_product_id() {
        let item: LineItem = serde_json::from_value(json!({"product_id": "sku-9"})).unwrap();
        assert_eq!(item.product_id.unwrap().to_string(), "sku-9");
        assert!(item.quantity.is_none());
    }

    #[test]
    fn test_mistyped_fields_are_absent() {
        let n: Notification = serde_json::from_value(json!({
            "event": 7,
            "currency": ["EUR"],
            "customer": {"email": 5, "phone": "+1 555"},
            "client_details": "n/a",
            "line_items": [{"product_id": true, "quantity": "2", "price": 2500}, 3]
        }))
        .unwrap();

        assert_eq!(n.event, None);
        assert_eq!(n.currency, None);
        assert_eq!(n.email(), None);
        assert_eq!(n.phone(), Some("+1 555"));
        assert!(n.client_details.is_none());

        let items = n.line_items.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].product_id.is_none());
        assert_eq!(items[0].quantity, Some(json!("2")));
        assert!(items[1].price.is_none());
    }

    #[test]
    fn test_from_json_never_fails() {
        assert!(Notification::from_json(json!(42)).event.is_none());
        assert!(Notification::from_json(json!([1, 2])).line_items.is_none());
        assert!(Notification::from_json(json!({"line_items": 5})).line_items.is_none());

        let n = Notification::from_json(json!({"event": "orders/create"}));
        assert_eq!(n.event.as_deref(), Some("orders/create"));
    }

    #[test]
    fn test_line_total() {
        let item: LineItem =
            serde_json::from_value(json!({"quantity": "3", "price": 1500})).unwrap();
        assert_eq!(item.quantity_units(), Some(3.0));
        assert_eq!(item.line_total(), 4500.0);

        let item: LineItem = serde_json::from_value(json!({"quantity": 2.0, "price": 250})).unwrap();
        assert_eq!(item.line_total(), 500.0);

        let item: LineItem = serde_json::from_value(json!({"quantity": 2})).unwrap();
        assert_eq!(item.line_total(), 0.0);
    }
}
