use jpashop_core::repo::delivery_repo::{DeliveryRepository, SqliteDeliveryRepository};
use jpashop_core::{
    Address, Delivery, DeliveryStatus, EntityManagerFactory, Item, Member, OrderLine,
    OrderRequest, OrderService, OrderStatus, PersistenceError, PersistenceUnit, RepoError,
    ValidationError,
};

struct Fixture {
    factory: EntityManagerFactory,
    member_id: i64,
    jpa_id: i64,
    sql_id: i64,
}

fn fixture() -> Fixture {
    let factory = EntityManagerFactory::create(&PersistenceUnit::in_memory("orders")).unwrap();
    let mut em = factory.create_entity_manager().unwrap();
    let (member_id, jpa_id, sql_id) = em
        .transactional(|tx| {
            let mut member = Member::new("kim", Address::new("Seoul", "Teheran-ro", "06234"));
            let mut jpa = Item::book("JPA", "kim").with_price(10_000).with_stock(10);
            let mut sql = Item::book("SQL", "lee").with_price(20_000).with_stock(2);
            Ok((
                tx.persist(&mut member)?,
                tx.persist(&mut jpa)?,
                tx.persist(&mut sql)?,
            ))
        })
        .unwrap();
    em.close();

    Fixture {
        factory,
        member_id,
        jpa_id,
        sql_id,
    }
}

fn stock_of(factory: &EntityManagerFactory, item_id: i64) -> i64 {
    let em = factory.create_entity_manager().unwrap();
    em.find::<Item>(item_id).unwrap().unwrap().stock_quantity
}

#[test]
fn place_order_cascades_to_delivery_and_line_items() {
    let fx = fixture();
    let service = OrderService::new(&fx.factory);

    let order = service
        .place_order(&OrderRequest {
            member_id: fx.member_id,
            lines: vec![
                OrderLine {
                    item_id: fx.jpa_id,
                    count: 2,
                },
                OrderLine {
                    item_id: fx.sql_id,
                    count: 1,
                },
            ],
            ship_to: None,
        })
        .unwrap();

    let order_id = order.id.unwrap();
    assert_eq!(order.total_price(), Ok(40_000));
    assert!(order.items.iter().all(|line| line.order_id == Some(order_id)));

    let loaded = service.find_order(order_id).unwrap().unwrap();
    assert_eq!(loaded.status, OrderStatus::Order);
    assert_eq!(loaded.member_id, Some(fx.member_id));
    assert_eq!(loaded.items.len(), 2);
    assert_eq!(loaded.total_price(), Ok(40_000));

    let delivery = loaded.delivery.expect("delivery is cascaded");
    assert_eq!(delivery.status, DeliveryStatus::Ready);
    assert_eq!(delivery.order_id, Some(order_id));
    assert_eq!(delivery.address.city.as_deref(), Some("Seoul"));

    let em = fx.factory.create_entity_manager().unwrap();
    let standalone = em
        .find::<Delivery>(delivery.id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(standalone.order_id, Some(order_id));
    drop(em);

    assert_eq!(stock_of(&fx.factory, fx.jpa_id), 8);
    assert_eq!(stock_of(&fx.factory, fx.sql_id), 1);
    assert_eq!(service.orders_of_member(fx.member_id).unwrap().len(), 1);
}

#[test]
fn insufficient_stock_leaves_no_trace() {
    let fx = fixture();
    let service = OrderService::new(&fx.factory);

    let err = service
        .place_order(&OrderRequest {
            member_id: fx.member_id,
            lines: vec![
                OrderLine {
                    item_id: fx.jpa_id,
                    count: 1,
                },
                OrderLine {
                    item_id: fx.sql_id,
                    count: 3,
                },
            ],
            ship_to: Some(Address::new("Busan", "Haeundae", "48099")),
        })
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Repo(RepoError::Validation(ValidationError::NotEnoughStock {
            requested: 3,
            available: 2
        }))
    ));
    assert_eq!(stock_of(&fx.factory, fx.jpa_id), 10);
    assert!(service.orders_of_member(fx.member_id).unwrap().is_empty());
    assert_eq!(fx.factory.open_entity_managers(), 0);
}

#[test]
fn unknown_member_is_reported() {
    let fx = fixture();
    let err = OrderService::new(&fx.factory)
        .place_order(&OrderRequest {
            member_id: 777,
            lines: Vec::new(),
            ship_to: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Repo(RepoError::NotFound {
            entity: "Member",
            id: 777
        })
    ));
}

#[test]
fn cancel_restores_stock_until_delivered() {
    let fx = fixture();
    let service = OrderService::new(&fx.factory);
    let request = OrderRequest {
        member_id: fx.member_id,
        lines: vec![OrderLine {
            item_id: fx.jpa_id,
            count: 4,
        }],
        ship_to: None,
    };

    let first = service.place_order(&request).unwrap();
    let cancelled = service.cancel_order(first.id.unwrap()).unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancel);
    assert_eq!(stock_of(&fx.factory, fx.jpa_id), 10);
    let reloaded = service.find_order(first.id.unwrap()).unwrap().unwrap();
    assert_eq!(reloaded.status, OrderStatus::Cancel);

    let second = service.place_order(&request).unwrap();
    let delivery_id = second.delivery.as_ref().and_then(|d| d.id).unwrap();
    service.complete_delivery(delivery_id).unwrap();

    let err = service.cancel_order(second.id.unwrap()).unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Repo(RepoError::Validation(ValidationError::AlreadyDelivered))
    ));
    assert_eq!(stock_of(&fx.factory, fx.jpa_id), 6);
}

fn single_line_request(fx: &Fixture, item_id: i64, count: i64) -> OrderRequest {
    OrderRequest {
        member_id: fx.member_id,
        lines: vec![OrderLine { item_id, count }],
        ship_to: None,
    }
}

#[test]
fn cancelling_twice_restores_stock_once() {
    let fx = fixture();
    let service = OrderService::new(&fx.factory);

    let order = service
        .place_order(&single_line_request(&fx, fx.jpa_id, 4))
        .unwrap();
    let order_id = order.id.unwrap();
    service.cancel_order(order_id).unwrap();
    assert_eq!(stock_of(&fx.factory, fx.jpa_id), 10);

    let err = service.cancel_order(order_id).unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Repo(RepoError::Validation(ValidationError::AlreadyCancelled))
    ));
    assert_eq!(stock_of(&fx.factory, fx.jpa_id), 10);
    assert_eq!(fx.factory.open_entity_managers(), 0);
}

#[test]
fn delivery_of_cancelled_order_cannot_complete() {
    let fx = fixture();
    let service = OrderService::new(&fx.factory);

    let order = service
        .place_order(&single_line_request(&fx, fx.jpa_id, 1))
        .unwrap();
    let delivery_id = order.delivery.as_ref().and_then(|d| d.id).unwrap();
    service.cancel_order(order.id.unwrap()).unwrap();

    let err = service.complete_delivery(delivery_id).unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Repo(RepoError::Validation(ValidationError::AlreadyCancelled))
    ));
    assert_eq!(fx.factory.open_entity_managers(), 0);

    let em = fx.factory.create_entity_manager().unwrap();
    let delivery = em.find::<Delivery>(delivery_id).unwrap().unwrap();
    assert_eq!(delivery.status, DeliveryStatus::Ready);
}

#[test]
fn completed_delivery_never_returns_to_ready() {
    let fx = fixture();
    let service = OrderService::new(&fx.factory);

    let order = service
        .place_order(&single_line_request(&fx, fx.jpa_id, 1))
        .unwrap();
    let delivery_id = order.delivery.as_ref().and_then(|d| d.id).unwrap();
    service.complete_delivery(delivery_id).unwrap();

    let err = service.complete_delivery(delivery_id).unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Repo(RepoError::Validation(
            ValidationError::InvalidDeliveryTransition {
                from: DeliveryStatus::Comp,
                to: DeliveryStatus::Comp,
            }
        ))
    ));

    let em = fx.factory.create_entity_manager().unwrap();
    let repo = SqliteDeliveryRepository::new(em.connection());
    let err = repo
        .update_status(delivery_id, DeliveryStatus::Ready)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidDeliveryTransition {
            from: DeliveryStatus::Comp,
            to: DeliveryStatus::Ready,
        })
    ));
    let delivery = repo.get_delivery(delivery_id).unwrap().unwrap();
    assert_eq!(delivery.status, DeliveryStatus::Comp);
}

#[test]
fn overflowing_order_total_is_rejected_before_commit() {
    let fx = fixture();
    let mut em = fx.factory.create_entity_manager().unwrap();
    let pricey_id = em
        .transactional(|tx| {
            let mut pricey = Item::book("Gold", "midas")
                .with_price(i64::MAX / 2)
                .with_stock(10);
            tx.persist(&mut pricey)
        })
        .unwrap();
    em.close();

    let service = OrderService::new(&fx.factory);
    let err = service
        .place_order(&single_line_request(&fx, pricey_id, 3))
        .unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Repo(RepoError::Validation(ValidationError::AmountOverflow))
    ));
    assert_eq!(stock_of(&fx.factory, pricey_id), 10);
    assert!(service.orders_of_member(fx.member_id).unwrap().is_empty());
}
