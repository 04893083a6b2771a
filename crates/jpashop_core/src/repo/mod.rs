//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define per-entity data access contracts.
//! - Keep SQL details and row mapping out of the persistence context.
//!
//! # Invariants
//! - Write paths validate entities before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repositories never open transactions; multi-row writes rely on the
//!   caller's transaction for atomicity.

pub mod delivery_repo;
pub mod error;
pub mod item_repo;
pub mod member_repo;
pub mod order_repo;

use crate::model::audit::AuditInfo;
use rusqlite::Row;

pub(crate) const AUDIT_COLUMNS: &str =
    "created_by, created_at, last_modified_by, last_modified_at";

pub(crate) fn read_audit(row: &Row<'_>) -> rusqlite::Result<AuditInfo> {
    Ok(AuditInfo {
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        last_modified_by: row.get("last_modified_by")?,
        last_modified_at: row.get("last_modified_at")?,
    })
}
