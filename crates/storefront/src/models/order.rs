//! Order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use yarn_core::{CartItem, Email, OrderId, OrderStatus};

/// Contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Hospital, hotel, school, or company ordering the uniforms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// An order as written to the remote document store.
///
/// Field names are camelCase on the wire; `orderId` is the field the
/// uniqueness lookup and the tracking page query on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    pub customer: Customer,
    pub items: Vec<CartItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// A new pending order.
    #[must_use]
    pub fn new(order_id: OrderId, customer: Customer, items: Vec<CartItem>) -> Self {
        Self {
            order_id,
            status: OrderStatus::Pending,
            customer,
            items,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Total number of garments across all lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn garment_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count: u32, i| count.saturating_add(i.product.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use yarn_core::ProductDescriptor;

    use super::*;

    fn customer() -> Customer {
        Customer {
            name: "Nora Al-Harbi".to_string(),
            email: Email::parse("nora@clinic.sa").unwrap(),
            phone: None,
            organization: Some("Riyadh Care Clinic".to_string()),
        }
    }

    fn line(id: &str, quantity: u32) -> CartItem {
        CartItem::new(
            id,
            ProductDescriptor {
                sector: "healthcare".to_string(),
                garment_type: "scrubs".to_string(),
                size: "L".to_string(),
                quantity,
            },
        )
    }

    #[test]
    fn test_new_order_is_pending() {
        let order = Order::new(
            OrderId::parse("YARN-ABCD1234").unwrap(),
            customer(),
            vec![line("a", 3), line("b", 2)],
        );
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.garment_count(), 5);
    }

    #[test]
    fn test_garment_count_saturates() {
        let order = Order::new(
            OrderId::parse("YARN-ABCD1234").unwrap(),
            customer(),
            vec![line("a", 4_000_000_000), line("b", 4_000_000_000)],
        );
        assert_eq!(order.garment_count(), u32::MAX);
    }

    #[test]
    fn test_wire_field_names() {
        let order = Order::new(
            OrderId::parse("YARN-ABCD1234").unwrap(),
            customer(),
            vec![line("a", 1)],
        );
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["orderId"], "YARN-ABCD1234");
        assert_eq!(json["status"], "pending");
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["customer"]["organization"], "Riyadh Care Clinic");
        assert!(json["customer"].get("phone").is_none());
    }
}
