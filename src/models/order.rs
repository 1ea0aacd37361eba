use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Cash,
    Online,
}

/// Delivery lifecycle. Transitions are forward-only and single-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Assigned,
    Picked,
    Delivered,
}

impl OrderStatus {
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::New => Some(OrderStatus::Assigned),
            OrderStatus::Assigned => Some(OrderStatus::Picked),
            OrderStatus::Picked => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    pub fn can_advance_to(self, to: OrderStatus) -> bool {
        self.next() == Some(to)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Assigned => "assigned",
            OrderStatus::Picked => "picked",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Photo bytes live in their own maps keyed by order id; the order record
/// only carries presence flags so JSON payloads stay small.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOrder {
    pub id: Uuid,
    pub customer: Principal,
    pub customer_name: String,
    pub mobile_number: String,
    pub pickup_address: String,
    pub delivery_address: String,
    pub pickup_location: String,
    pub drop_location: String,
    pub parcel_description: String,
    pub payment_type: PaymentType,
    pub status: OrderStatus,
    pub assigned_rider: Option<Principal>,
    pub has_parcel_photo: bool,
    pub has_proof_photo: bool,
    pub proof_photo_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::OrderStatus;

    #[test]
    fn status_advances_one_step_at_a_time() {
        assert!(OrderStatus::New.can_advance_to(OrderStatus::Assigned));
        assert!(OrderStatus::Assigned.can_advance_to(OrderStatus::Picked));
        assert!(OrderStatus::Picked.can_advance_to(OrderStatus::Delivered));
    }

    #[test]
    fn status_rejects_skips_and_backward_moves() {
        assert!(!OrderStatus::New.can_advance_to(OrderStatus::Picked));
        assert!(!OrderStatus::New.can_advance_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Assigned.can_advance_to(OrderStatus::New));
        assert!(!OrderStatus::Delivered.can_advance_to(OrderStatus::Picked));
        assert_eq!(OrderStatus::Delivered.next(), None);
    }
}
