//! Validation failures raised by entity invariants.

use crate::model::delivery::DeliveryStatus;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invariant violation detected before a write or after a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    NegativeValue {
        entity: &'static str,
        field: &'static str,
        value: i64,
    },
    NonPositiveCount(i64),
    NotEnoughStock {
        requested: i64,
        available: i64,
    },
    /// A referenced entity has not been persisted yet.
    TransientReference {
        entity: &'static str,
    },
    /// Completed deliveries cannot be cancelled.
    AlreadyDelivered,
    AlreadyCancelled,
    /// Deliveries only move from `Ready` to `Comp`.
    InvalidDeliveryTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },
    /// A price or total does not fit in an `i64`.
    AmountOverflow,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField { entity, field } => write!(f, "{entity}.{field} must not be empty"),
            Self::NegativeValue {
                entity,
                field,
                value,
            } => write!(f, "{entity}.{field} must not be negative, got {value}"),
            Self::NonPositiveCount(count) => {
                write!(f, "order item count must be positive, got {count}")
            }
            Self::NotEnoughStock {
                requested,
                available,
            } => write!(
                f,
                "not enough stock: requested {requested}, available {available}"
            ),
            Self::TransientReference { entity } => {
                write!(f, "referenced {entity} has not been persisted")
            }
            Self::AlreadyDelivered => write!(f, "order has already been delivered"),
            Self::AlreadyCancelled => write!(f, "order has already been cancelled"),
            Self::InvalidDeliveryTransition { from, to } => {
                write!(f, "delivery status cannot change from {from:?} to {to:?}")
            }
            Self::AmountOverflow => write!(f, "order amount overflows"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}

pub(crate) fn require_non_negative(
    entity: &'static str,
    field: &'static str,
    value: i64,
) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeValue {
            entity,
            field,
            value,
        });
    }
    Ok(())
}
