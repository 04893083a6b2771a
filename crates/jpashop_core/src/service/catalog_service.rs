//! Catalog use-cases: registering items.
//!
//! # Invariants
//! - Each call uses its own entity manager, released before returning on
//!   both success and failure.
//! - A failed registration leaves no row behind.

use crate::model::item::{Item, ItemId};
use crate::persistence::{EntityManagerFactory, PersistenceResult};
use crate::repo::error::RepoError;
use log::{error, info};

/// Catalog service over one entity manager factory.
pub struct CatalogService<'f> {
    factory: &'f EntityManagerFactory,
}

impl<'f> CatalogService<'f> {
    pub fn new(factory: &'f EntityManagerFactory) -> Self {
        Self { factory }
    }

    /// Persists a new book and returns its generated id.
    ///
    /// This is the whole unit of work of the command-line routine: open an
    /// entity manager, begin, persist one book, commit or roll back, close.
    pub fn register_book(&self, name: &str, author: &str) -> PersistenceResult<ItemId> {
        let item = self.register_item(Item::book(name, author))?;
        item.id
            .ok_or_else(|| RepoError::InvalidData("persisted book has no id".to_string()).into())
    }

    /// Persists any transient item and returns it with its id assigned.
    pub fn register_item(&self, mut item: Item) -> PersistenceResult<Item> {
        let mut em = self.factory.create_entity_manager()?;
        let outcome = em.transactional(|tx| tx.persist(&mut item));
        em.close();

        match outcome {
            Ok(id) => {
                info!(
                    "event=item_register module=service status=ok dtype={} id={}",
                    item.kind.discriminator(),
                    id
                );
                Ok(item)
            }
            Err(err) => {
                error!(
                    "event=item_register module=service status=error dtype={} error={}",
                    item.kind.discriminator(),
                    err
                );
                Err(err)
            }
        }
    }
}
