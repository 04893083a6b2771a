//! Order repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the order aggregate with cascade to delivery and line items.
//! - Load orders eagerly, including line items and delivery.
//!
//! # Invariants
//! - `create_order` writes several rows; callers run it inside one
//!   transaction so a failure leaves no partial aggregate behind.
//! - The delivery row is written before the order row that references it.

use crate::model::audit::now_epoch_ms;
use crate::model::member::MemberId;
use crate::model::order::{Order, OrderId, OrderItem, OrderStatus};
use crate::repo::delivery_repo::{DeliveryRepository, SqliteDeliveryRepository};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::{read_audit, AUDIT_COLUMNS};
use rusqlite::{params, Connection, Row};

const ORDER_SELECT_SQL: &str = "SELECT
    order_id,
    member_id,
    delivery_id,
    order_date,
    status,
    created_by,
    created_at,
    last_modified_by,
    last_modified_at
FROM orders";

/// Repository interface for the order aggregate.
pub trait OrderRepository {
    /// Inserts the order, its delivery and its line items; assigns every id.
    fn create_order(&self, order: &mut Order) -> RepoResult<OrderId>;
    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>>;
    fn find_by_member(&self, member_id: MemberId) -> RepoResult<Vec<Order>>;
    fn update_status(&self, id: OrderId, status: OrderStatus) -> RepoResult<()>;
}

pub struct SqliteOrderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrderRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert_order_item(&self, order_id: OrderId, line: &mut OrderItem) -> RepoResult<()> {
        line.validate()?;
        line.audit.stamp_created(now_epoch_ms());
        self.conn.execute(
            &format!(
                "INSERT INTO order_items (order_id, item_id, order_price, count, {AUDIT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);"
            ),
            params![
                order_id,
                line.item_id,
                line.order_price,
                line.count,
                line.audit.created_by.as_deref(),
                line.audit.created_at,
                line.audit.last_modified_by.as_deref(),
                line.audit.last_modified_at,
            ],
        )?;
        line.id = Some(self.conn.last_insert_rowid());
        line.order_id = Some(order_id);
        Ok(())
    }

    fn load_order_items(&self, order_id: OrderId) -> RepoResult<Vec<OrderItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT order_item_id, order_id, item_id, order_price, count, {AUDIT_COLUMNS}
             FROM order_items
             WHERE order_id = ?1
             ORDER BY order_item_id ASC;"
        ))?;
        let mut rows = stmt.query([order_id])?;
        let mut lines = Vec::new();
        while let Some(row) = rows.next()? {
            let line = OrderItem {
                id: Some(row.get("order_item_id")?),
                order_id: Some(row.get("order_id")?),
                item_id: row.get("item_id")?,
                order_price: row.get("order_price")?,
                count: row.get("count")?,
                audit: read_audit(row)?,
            };
            line.validate()?;
            lines.push(line);
        }
        Ok(lines)
    }

    fn load_aggregate(&self, row: &Row<'_>) -> RepoResult<Order> {
        let id: OrderId = row.get("order_id")?;
        let status_text: String = row.get("status")?;
        let status = parse_order_status(&status_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid order status `{status_text}` in orders.status"
            ))
        })?;

        let delivery = match row.get::<_, Option<i64>>("delivery_id")? {
            Some(delivery_id) => {
                let delivery = SqliteDeliveryRepository::new(self.conn)
                    .get_delivery(delivery_id)?
                    .ok_or_else(|| {
                        RepoError::InvalidData(format!(
                            "order {id} references missing delivery {delivery_id}"
                        ))
                    })?;
                Some(delivery)
            }
            None => None,
        };

        let order = Order {
            id: Some(id),
            member_id: row.get("member_id")?,
            order_date: row.get("order_date")?,
            status,
            items: self.load_order_items(id)?,
            delivery,
            audit: read_audit(row)?,
        };
        order.validate()?;
        Ok(order)
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn create_order(&self, order: &mut Order) -> RepoResult<OrderId> {
        order.validate()?;
        order.audit.stamp_created(now_epoch_ms());

        let delivery_id = match order.delivery.as_mut() {
            Some(delivery) => match delivery.id {
                Some(existing) => Some(existing),
                None => Some(SqliteDeliveryRepository::new(self.conn).create_delivery(delivery)?),
            },
            None => None,
        };

        self.conn.execute(
            &format!(
                "INSERT INTO orders (member_id, delivery_id, order_date, status, {AUDIT_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);"
            ),
            params![
                order.member_id,
                delivery_id,
                order.order_date,
                order_status_to_db(order.status),
                order.audit.created_by.as_deref(),
                order.audit.created_at,
                order.audit.last_modified_by.as_deref(),
                order.audit.last_modified_at,
            ],
        )?;
        let order_id = self.conn.last_insert_rowid();
        order.id = Some(order_id);

        for line in &mut order.items {
            self.insert_order_item(order_id, line)?;
        }
        if let Some(delivery) = order.delivery.as_mut() {
            delivery.order_id = Some(order_id);
        }

        Ok(order_id)
    }

    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ORDER_SELECT_SQL} WHERE order_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.load_aggregate(row)?));
        }
        Ok(None)
    }

    fn find_by_member(&self, member_id: MemberId) -> RepoResult<Vec<Order>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ORDER_SELECT_SQL} WHERE member_id = ?1 ORDER BY order_date DESC, order_id ASC;"
        ))?;
        let mut rows = stmt.query([member_id])?;
        let mut orders = Vec::new();
        while let Some(row) = rows.next()? {
            orders.push(self.load_aggregate(row)?);
        }
        Ok(orders)
    }

    fn update_status(&self, id: OrderId, status: OrderStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE orders
             SET status = ?1, last_modified_at = ?2
             WHERE order_id = ?3;",
            params![order_status_to_db(status), now_epoch_ms(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "Order", id });
        }
        Ok(())
    }
}

fn order_status_to_db(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Order => "order",
        OrderStatus::Cancel => "cancel",
    }
}

fn parse_order_status(value: &str) -> Option<OrderStatus> {
    match value {
        "order" => Some(OrderStatus::Order),
        "cancel" => Some(OrderStatus::Cancel),
        _ => None,
    }
}
