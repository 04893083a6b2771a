//! Order use-cases: placing and cancelling orders.
//!
//! # Responsibility
//! - Check stock and capture prices when an order is placed.
//! - Keep stock, order rows and delivery in one transaction.
//!
//! # Invariants
//! - Stock never goes negative; an order that cannot be filled writes nothing.
//! - Cancelling restores the stock taken by every line item, exactly once.
//! - Deliveries of cancelled orders are never completed.

use crate::model::audit::Address;
use crate::model::delivery::{Delivery, DeliveryId, DeliveryStatus};
use crate::model::item::{Item, ItemId};
use crate::model::member::{Member, MemberId};
use crate::model::order::{Order, OrderId, OrderItem, OrderStatus};
use crate::persistence::{EntityManagerFactory, EntityTransaction, PersistenceResult};
use crate::repo::delivery_repo::{DeliveryRepository, SqliteDeliveryRepository};
use crate::model::validation::ValidationError;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository};
use crate::repo::order_repo::{OrderRepository, SqliteOrderRepository};
use log::info;

/// One requested line of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub item_id: ItemId,
    pub count: i64,
}

/// Input for placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub member_id: MemberId,
    pub lines: Vec<OrderLine>,
    /// Shipping address; the member's address when `None`.
    pub ship_to: Option<Address>,
}

pub struct OrderService<'f> {
    factory: &'f EntityManagerFactory,
}

impl<'f> OrderService<'f> {
    pub fn new(factory: &'f EntityManagerFactory) -> Self {
        Self { factory }
    }

    /// Places an order, taking stock from every requested item.
    pub fn place_order(&self, request: &OrderRequest) -> PersistenceResult<Order> {
        let mut em = self.factory.create_entity_manager()?;
        let (order, total) = em.transactional(|tx| {
            let member = tx
                .find::<Member>(request.member_id)?
                .ok_or(RepoError::NotFound {
                    entity: "Member",
                    id: request.member_id,
                })?;

            let mut order = Order::new(member.id);
            for line in &request.lines {
                let item = take_stock(tx, line.item_id, line.count)?;
                order.add_order_item(OrderItem::for_item(&item, line.count)?);
            }

            let address = request.ship_to.clone().unwrap_or(member.address);
            order.set_delivery(Delivery::new(address));
            let total = order.total_price()?;
            tx.persist(&mut order)?;
            Ok((order, total))
        })?;
        em.close();

        info!(
            "event=order_place module=service status=ok order_id={} lines={} total={}",
            order.id.unwrap_or_default(),
            order.items.len(),
            total
        );
        Ok(order)
    }

    /// Cancels an order and returns its stock.
    pub fn cancel_order(&self, order_id: OrderId) -> PersistenceResult<Order> {
        let mut em = self.factory.create_entity_manager()?;
        let order = em.transactional(|tx| {
            let mut order = tx.find::<Order>(order_id)?.ok_or(RepoError::NotFound {
                entity: "Order",
                id: order_id,
            })?;
            order.cancel()?;

            let items = SqliteItemRepository::new(tx.connection());
            for line in &order.items {
                let mut item = load_item(tx, line.item_id)?;
                item.add_stock(line.count)?;
                items.update_item(&mut item)?;
            }
            SqliteOrderRepository::new(tx.connection()).update_status(order_id, order.status)?;
            Ok(order)
        })?;
        em.close();

        info!("event=order_cancel module=service status=ok order_id={order_id}");
        Ok(order)
    }

    /// Marks the delivery of an active order as completed.
    pub fn complete_delivery(&self, delivery_id: DeliveryId) -> PersistenceResult<()> {
        let mut em = self.factory.create_entity_manager()?;
        let outcome = em.transactional(|tx| {
            let mut delivery = tx
                .find::<Delivery>(delivery_id)?
                .ok_or(RepoError::NotFound {
                    entity: "Delivery",
                    id: delivery_id,
                })?;
            if let Some(order_id) = delivery.order_id {
                let status = SqliteOrderRepository::new(tx.connection())
                    .get_order(order_id)?
                    .map(|order| order.status);
                if status == Some(OrderStatus::Cancel) {
                    return Err(ValidationError::AlreadyCancelled.into());
                }
            }
            delivery.transition_to(DeliveryStatus::Comp)?;
            SqliteDeliveryRepository::new(tx.connection())
                .update_status(delivery_id, delivery.status)
        });
        em.close();
        outcome?;

        info!("event=delivery_complete module=service status=ok delivery_id={delivery_id}");
        Ok(())
    }

    pub fn find_order(&self, order_id: OrderId) -> PersistenceResult<Option<Order>> {
        let em = self.factory.create_entity_manager()?;
        Ok(em.find::<Order>(order_id)?)
    }

    pub fn orders_of_member(&self, member_id: MemberId) -> PersistenceResult<Vec<Order>> {
        let em = self.factory.create_entity_manager()?;
        let orders = SqliteOrderRepository::new(em.connection()).find_by_member(member_id)?;
        Ok(orders)
    }
}

fn load_item(tx: &EntityTransaction<'_>, item_id: ItemId) -> RepoResult<Item> {
    tx.find::<Item>(item_id)?.ok_or(RepoError::NotFound {
        entity: "Item",
        id: item_id,
    })
}

fn take_stock(tx: &EntityTransaction<'_>, item_id: ItemId, count: i64) -> RepoResult<Item> {
    let mut item = load_item(tx, item_id)?;
    item.remove_stock(count)?;
    SqliteItemRepository::new(tx.connection()).update_item(&mut item)?;
    Ok(item)
}
