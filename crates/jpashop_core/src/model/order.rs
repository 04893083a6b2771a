//! Order aggregate: the order row, its line items and its delivery.
//!
//! # Responsibility
//! - Maintain both sides of the order/line-item association in memory.
//! - Compute derived values such as the order total.
//!
//! # Invariants
//! - Line items reference persisted items (`item_id` comes from a saved row).
//! - Every line item has a positive count and a non-negative price.
//! - Line totals and the order total fit in an `i64`.
//! - A cancelled order cannot be cancelled again.
//! - Persisting an order cascades to its delivery and line items.

use crate::model::audit::{now_epoch_ms, AuditInfo};
use crate::model::delivery::Delivery;
use crate::model::item::{Item, ItemId};
use crate::model::member::MemberId;
use crate::model::validation::{require_non_negative, ValidationError};
use serde::{Deserialize, Serialize};

pub type OrderId = i64;
pub type OrderItemId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Order,
    Cancel,
}

/// Line item linking an order to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Option<OrderItemId>,
    /// Set when the owning order is persisted.
    pub order_id: Option<OrderId>,
    pub item_id: ItemId,
    /// Unit price captured at order time.
    pub order_price: i64,
    pub count: i64,
    pub audit: AuditInfo,
}

impl OrderItem {
    /// Builds a line item for a persisted `item` at its current price.
    pub fn for_item(item: &Item, count: i64) -> Result<Self, ValidationError> {
        let item_id = item
            .id
            .ok_or(ValidationError::TransientReference { entity: "Item" })?;
        let line = Self {
            id: None,
            order_id: None,
            item_id,
            order_price: item.price,
            count,
            audit: AuditInfo::default(),
        };
        line.validate()?;
        Ok(line)
    }

    pub fn total_price(&self) -> Result<i64, ValidationError> {
        self.order_price
            .checked_mul(self.count)
            .ok_or(ValidationError::AmountOverflow)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.count <= 0 {
            return Err(ValidationError::NonPositiveCount(self.count));
        }
        require_non_negative("OrderItem", "order_price", self.order_price)?;
        self.total_price().map(|_| ())
    }
}

/// Customer order with cascaded line items and delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<OrderId>,
    pub member_id: Option<MemberId>,
    /// Epoch milliseconds.
    pub order_date: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub delivery: Option<Delivery>,
    pub audit: AuditInfo,
}

impl Order {
    /// Creates a transient order dated now.
    pub fn new(member_id: Option<MemberId>) -> Self {
        Self {
            id: None,
            member_id,
            order_date: now_epoch_ms(),
            status: OrderStatus::Order,
            items: Vec::new(),
            delivery: None,
            audit: AuditInfo::default(),
        }
    }

    /// Adds a line item and points it at this order.
    pub fn add_order_item(&mut self, mut item: OrderItem) {
        item.order_id = self.id;
        self.items.push(item);
    }

    /// Attaches the delivery, keeping its inverse reference in sync.
    pub fn set_delivery(&mut self, mut delivery: Delivery) {
        delivery.order_id = self.id;
        self.delivery = Some(delivery);
    }

    pub fn total_price(&self) -> Result<i64, ValidationError> {
        self.items.iter().try_fold(0_i64, |total, line| {
            total
                .checked_add(line.total_price()?)
                .ok_or(ValidationError::AmountOverflow)
        })
    }

    /// Marks the order cancelled unless it already is or its delivery is
    /// completed.
    pub fn cancel(&mut self) -> Result<(), ValidationError> {
        if self.status == OrderStatus::Cancel {
            return Err(ValidationError::AlreadyCancelled);
        }
        if self.delivery.as_ref().is_some_and(Delivery::is_completed) {
            return Err(ValidationError::AlreadyDelivered);
        }
        self.status = OrderStatus::Cancel;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for item in &self.items {
            item.validate()?;
        }
        self.total_price().map(|_| ())
    }
}
