//! Shop entities mapped onto SQLite, with a small persistence context
//! (entity manager factory, entity manager, transaction) on top.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod repo;
pub mod service;

pub use config::{DataSource, PersistenceConfig, PersistenceUnit, DEFAULT_UNIT_NAME};
pub use logging::{default_log_dir, default_log_level, init_logging, logging_status};
pub use model::audit::{Address, AuditInfo};
pub use model::delivery::{Delivery, DeliveryId, DeliveryStatus};
pub use model::item::{Album, Book, Item, ItemId, ItemKind, Movie};
pub use model::member::{Member, MemberId};
pub use model::order::{Order, OrderId, OrderItem, OrderStatus};
pub use model::validation::ValidationError;
pub use persistence::{
    Entity, EntityManager, EntityManagerFactory, EntityTransaction, PersistenceError,
    PersistenceResult,
};
pub use repo::error::{RepoError, RepoResult};
pub use service::catalog_service::CatalogService;
pub use service::order_service::{OrderLine, OrderRequest, OrderService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
