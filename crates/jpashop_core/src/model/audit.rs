//! Values shared by every entity: audit columns and the embedded address.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Audit columns carried by every mapped entity.
///
/// Timestamps are Unix epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub created_by: Option<String>,
    pub created_at: Option<i64>,
    pub last_modified_by: Option<String>,
    pub last_modified_at: Option<i64>,
}

impl AuditInfo {
    /// Fills missing timestamps right before the first insert.
    pub fn stamp_created(&mut self, now_ms: i64) {
        let created_at = *self.created_at.get_or_insert(now_ms);
        if self.last_modified_at.is_none() {
            self.last_modified_at = Some(created_at);
        }
    }

    /// Records a modification at `now_ms`.
    pub fn stamp_modified(&mut self, now_ms: i64) {
        self.last_modified_at = Some(now_ms);
    }
}

/// Embeddable postal address shared by members and deliveries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub street: Option<String>,
    pub zipcode: Option<String>,
}

impl Address {
    pub fn new(
        city: impl Into<String>,
        street: impl Into<String>,
        zipcode: impl Into<String>,
    ) -> Self {
        Self {
            city: Some(city.into()),
            street: Some(street.into()),
            zipcode: Some(zipcode.into()),
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::AuditInfo;

    #[test]
    fn stamp_created_keeps_existing_values() {
        let mut audit = AuditInfo {
            created_at: Some(10),
            ..AuditInfo::default()
        };
        audit.stamp_created(99);
        assert_eq!(audit.created_at, Some(10));
        assert_eq!(audit.last_modified_at, Some(10));
    }
}
