//! Member (customer) domain model.

use crate::model::audit::{Address, AuditInfo};
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

pub type MemberId = i64;

/// Customer placing orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Option<MemberId>,
    pub name: String,
    pub address: Address,
    pub audit: AuditInfo,
}

impl Member {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            id: None,
            name: name.into(),
            address,
            audit: AuditInfo::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("Member", "name", &self.name)
    }
}
