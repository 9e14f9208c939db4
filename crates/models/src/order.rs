use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use kfs_core::json::{self, Object};
use kfs_core::{DomainError, DomainResult, ValueObject};

/// Order status lifecycle as reported by the order API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// A purchase record (invoice line item) held in a user's invoice history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    /// Price in smallest currency unit (e.g., cents).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ValueObject for Order {}

impl Order {
    /// A bare line item carrying only its id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sku: None,
            product_id: None,
            name: None,
            quantity: None,
            unit_price: None,
            status: None,
            created_at: None,
        }
    }

    /// Fail-soft construction from a raw payload.
    pub fn from_json(value: &Value) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// Check a constructed order against the rules its payload form must meet.
    ///
    /// Typed fields always serialise to valid JSON, so only the id can break
    /// the order shape.
    pub fn validate(&self) -> DomainResult<()> {
        if self.id.is_empty() {
            return Err(DomainError::invalid("id", "must not be empty"));
        }
        Ok(())
    }

    /// Line total (`quantity * unit_price`), when both are known.
    pub fn total(&self) -> Option<i128> {
        let qty = self.quantity?;
        let price = self.unit_price?;
        Some((qty as i128).saturating_mul(price as i128))
    }

    fn from_object(obj: &Object) -> DomainResult<Self> {
        let status = match json::optional_string(obj, "status")? {
            None => None,
            Some(s) => Some(
                OrderStatus::parse(&s)
                    .ok_or_else(|| DomainError::invalid("status", format!("unknown status `{s}`")))?,
            ),
        };

        let created_at = match json::optional_string(obj, "createdAt")? {
            None => None,
            Some(s) => Some(
                kfs_core::time::to_utc(s.as_str())
                    .ok_or_else(|| DomainError::invalid("createdAt", "expected RFC 3339 timestamp"))?,
            ),
        };

        Ok(Self {
            id: json::required_string(obj, "id")?,
            sku: json::optional_string(obj, "sku")?,
            product_id: json::optional_string(obj, "productId")?,
            name: json::optional_string(obj, "name")?,
            quantity: json::optional_i64(obj, "quantity")?,
            unit_price: json::optional_u64(obj, "unitPrice")?,
            status,
            created_at,
        })
    }
}

impl TryFrom<&Value> for Order {
    type Error = DomainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_object(json::as_object(value)?)
    }
}

/// Order-shape predicate: a JSON object with a non-empty string `id` whose
/// optional fields carry the right types.
pub fn is_order(value: &Value) -> bool {
    Order::try_from(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_payload_only_needs_an_id() {
        let order = Order::from_json(&json!({ "id": "A" })).unwrap();
        assert_eq!(order, Order::new("A"));
    }

    #[test]
    fn full_payload_is_parsed() {
        let order = Order::from_json(&json!({
            "id": "ord-1",
            "sku": "SKU-9",
            "productId": "p-1",
            "name": "Desk lamp",
            "quantity": 3,
            "unitPrice": 1250,
            "status": "shipped",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(order.status, Some(OrderStatus::Shipped));
        assert_eq!(order.total(), Some(3750));
        assert_eq!(
            order.created_at.unwrap().to_rfc3339(),
            "2024-05-01T10:00:00+00:00"
        );
    }

    #[test]
    fn shape_predicate_rejects_malformed_payloads() {
        assert!(!is_order(&json!({})));
        assert!(!is_order(&json!({ "id": "" })));
        assert!(!is_order(&json!({ "id": 7 })));
        assert!(!is_order(&json!("A")));
        assert!(!is_order(&json!({ "id": "A", "quantity": "two" })));
        assert!(!is_order(&json!({ "id": "A", "status": "lost" })));
        assert!(!is_order(&json!({ "id": "A", "createdAt": "yesterday" })));
        assert!(is_order(&json!({ "id": "A", "quantity": null })));
    }

    #[test]
    fn serialization_round_trips_through_the_predicate() {
        let order = Order::from_json(&json!({
            "id": "A",
            "quantity": 2,
            "unitPrice": 10,
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(Order::from_json(&value), Some(order));
    }

    #[test]
    fn validate_agrees_with_the_shape_predicate() {
        for id in ["", "A"] {
            let order = Order::new(id);
            let value = serde_json::to_value(&order).unwrap();
            assert_eq!(order.validate().is_ok(), is_order(&value), "id {id:?}");
        }
    }

    #[test]
    fn total_is_none_without_price() {
        let mut order = Order::new("A");
        order.quantity = Some(2);
        assert_eq!(order.total(), None);
    }
}
