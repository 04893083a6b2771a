//! Mapping seam between domain entities and their repositories.

use crate::model::delivery::Delivery;
use crate::model::item::Item;
use crate::model::member::Member;
use crate::model::order::Order;
use crate::repo::delivery_repo::{DeliveryRepository, SqliteDeliveryRepository};
use crate::repo::error::RepoResult;
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository};
use crate::repo::member_repo::{MemberRepository, SqliteMemberRepository};
use crate::repo::order_repo::{OrderRepository, SqliteOrderRepository};
use rusqlite::Connection;

/// A domain type that the entity manager can persist and load by id.
pub trait Entity: Sized {
    /// Entity name used in logs and errors.
    const NAME: &'static str;

    /// Generated id, `None` while transient.
    fn id(&self) -> Option<i64>;

    /// Inserts the entity (and anything it cascades to) and assigns ids.
    fn insert(&mut self, conn: &Connection) -> RepoResult<i64>;

    fn load(conn: &Connection, id: i64) -> RepoResult<Option<Self>>;
}

impl Entity for Item {
    const NAME: &'static str = "Item";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn insert(&mut self, conn: &Connection) -> RepoResult<i64> {
        SqliteItemRepository::new(conn).create_item(self)
    }

    fn load(conn: &Connection, id: i64) -> RepoResult<Option<Self>> {
        SqliteItemRepository::new(conn).get_item(id)
    }
}

impl Entity for Member {
    const NAME: &'static str = "Member";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn insert(&mut self, conn: &Connection) -> RepoResult<i64> {
        SqliteMemberRepository::new(conn).create_member(self)
    }

    fn load(conn: &Connection, id: i64) -> RepoResult<Option<Self>> {
        SqliteMemberRepository::new(conn).get_member(id)
    }
}

impl Entity for Order {
    const NAME: &'static str = "Order";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn insert(&mut self, conn: &Connection) -> RepoResult<i64> {
        SqliteOrderRepository::new(conn).create_order(self)
    }

    fn load(conn: &Connection, id: i64) -> RepoResult<Option<Self>> {
        SqliteOrderRepository::new(conn).get_order(id)
    }
}

impl Entity for Delivery {
    const NAME: &'static str = "Delivery";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn insert(&mut self, conn: &Connection) -> RepoResult<i64> {
        SqliteDeliveryRepository::new(conn).create_delivery(self)
    }

    fn load(conn: &Connection, id: i64) -> RepoResult<Option<Self>> {
        SqliteDeliveryRepository::new(conn).get_delivery(id)
    }
}
