//! Delivery domain model.
//!
//! # Invariants
//! - `orders.delivery_id` owns the one-to-one link; `order_id` here is the
//!   inverse side and is only populated when loading.
//! - Status transitions only from `Ready` to `Comp`.

use crate::model::audit::{Address, AuditInfo};
use crate::model::order::OrderId;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

pub type DeliveryId = i64;

/// Shipping state of a delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Waiting to be shipped.
    #[default]
    Ready,
    /// Delivered.
    Comp,
}

/// Shipping record attached to exactly one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Option<DeliveryId>,
    pub address: Address,
    pub status: DeliveryStatus,
    /// Owning order, read back through the inverse mapping.
    pub order_id: Option<OrderId>,
    pub audit: AuditInfo,
}

impl Delivery {
    pub fn new(address: Address) -> Self {
        Self {
            id: None,
            address,
            status: DeliveryStatus::Ready,
            order_id: None,
            audit: AuditInfo::default(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == DeliveryStatus::Comp
    }

    /// Moves to `next`; only `Ready` to `Comp` is allowed.
    pub fn transition_to(&mut self, next: DeliveryStatus) -> Result<(), ValidationError> {
        self.status.check_transition(next)?;
        self.status = next;
        Ok(())
    }
}

impl DeliveryStatus {
    pub fn check_transition(self, next: DeliveryStatus) -> Result<(), ValidationError> {
        match (self, next) {
            (DeliveryStatus::Ready, DeliveryStatus::Comp) => Ok(()),
            (from, to) => Err(ValidationError::InvalidDeliveryTransition { from, to }),
        }
    }
}
