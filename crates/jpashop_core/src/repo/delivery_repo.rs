//! Delivery repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deliveries never store the order link; `order_id` is resolved through
//!   `orders.delivery_id` on every read.
//! - `update_status` only accepts the `Ready` to `Comp` transition.

use crate::model::audit::{now_epoch_ms, Address};
use crate::model::delivery::{Delivery, DeliveryId, DeliveryStatus};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::read_audit;
use rusqlite::{params, Connection, Row};

const DELIVERY_SELECT_SQL: &str = "SELECT
    d.delivery_id,
    d.city,
    d.street,
    d.zipcode,
    d.status,
    d.created_by,
    d.created_at,
    d.last_modified_by,
    d.last_modified_at,
    o.order_id
FROM deliveries d
LEFT JOIN orders o ON o.delivery_id = d.delivery_id";

/// Repository interface for delivery persistence.
pub trait DeliveryRepository {
    fn create_delivery(&self, delivery: &mut Delivery) -> RepoResult<DeliveryId>;
    fn get_delivery(&self, id: DeliveryId) -> RepoResult<Option<Delivery>>;
    fn update_status(&self, id: DeliveryId, status: DeliveryStatus) -> RepoResult<()>;
}

pub struct SqliteDeliveryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDeliveryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DeliveryRepository for SqliteDeliveryRepository<'_> {
    fn create_delivery(&self, delivery: &mut Delivery) -> RepoResult<DeliveryId> {
        delivery.audit.stamp_created(now_epoch_ms());

        self.conn.execute(
            "INSERT INTO deliveries (
                city,
                street,
                zipcode,
                status,
                created_by,
                created_at,
                last_modified_by,
                last_modified_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                delivery.address.city.as_deref(),
                delivery.address.street.as_deref(),
                delivery.address.zipcode.as_deref(),
                delivery_status_to_db(delivery.status),
                delivery.audit.created_by.as_deref(),
                delivery.audit.created_at,
                delivery.audit.last_modified_by.as_deref(),
                delivery.audit.last_modified_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        delivery.id = Some(id);
        Ok(id)
    }

    fn get_delivery(&self, id: DeliveryId) -> RepoResult<Option<Delivery>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DELIVERY_SELECT_SQL} WHERE d.delivery_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_delivery_row(row)?));
        }
        Ok(None)
    }

    fn update_status(&self, id: DeliveryId, status: DeliveryStatus) -> RepoResult<()> {
        let current = self
            .get_delivery(id)?
            .ok_or(RepoError::NotFound {
                entity: "Delivery",
                id,
            })?
            .status;
        current.check_transition(status)?;

        let changed = self.conn.execute(
            "UPDATE deliveries
             SET status = ?1, last_modified_at = ?2
             WHERE delivery_id = ?3;",
            params![delivery_status_to_db(status), now_epoch_ms(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "Delivery",
                id,
            });
        }
        Ok(())
    }
}

fn parse_delivery_row(row: &Row<'_>) -> RepoResult<Delivery> {
    let status_text: String = row.get("status")?;
    let status = parse_delivery_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid delivery status `{status_text}` in deliveries.status"
        ))
    })?;

    Ok(Delivery {
        id: Some(row.get("delivery_id")?),
        address: Address {
            city: row.get("city")?,
            street: row.get("street")?,
            zipcode: row.get("zipcode")?,
        },
        status,
        order_id: row.get("order_id")?,
        audit: read_audit(row)?,
    })
}

fn delivery_status_to_db(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Ready => "ready",
        DeliveryStatus::Comp => "comp",
    }
}

fn parse_delivery_status(value: &str) -> Option<DeliveryStatus> {
    match value {
        "ready" => Some(DeliveryStatus::Ready),
        "comp" => Some(DeliveryStatus::Comp),
        _ => None,
    }
}
