//! Entity manager and entity transaction.
//!
//! # Invariants
//! - Writes happen only through `EntityTransaction`.
//! - `transactional` commits on `Ok` and rolls back on `Err`; the error is
//!   returned to the caller.

use super::entity::Entity;
use super::PersistenceResult;
use crate::repo::error::{RepoError, RepoResult};
use log::{debug, error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Persistence context owning one database connection.
pub struct EntityManager {
    conn: Connection,
    unit_name: String,
    open_managers: Arc<AtomicUsize>,
}

impl EntityManager {
    pub(super) fn new(
        conn: Connection,
        unit_name: String,
        open_managers: Arc<AtomicUsize>,
    ) -> Self {
        let open = open_managers.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("event=em_open module=persistence status=ok unit={unit_name} open={open}");
        Self {
            conn,
            unit_name,
            open_managers,
        }
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Underlying connection. Statements run here are outside any
    /// `EntityTransaction` and autocommit.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Starts a write transaction.
    pub fn begin(&mut self) -> PersistenceResult<EntityTransaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        debug!(
            "event=tx_begin module=persistence status=ok unit={}",
            self.unit_name
        );
        Ok(EntityTransaction {
            tx,
            unit_name: self.unit_name.as_str(),
            started_at: Instant::now(),
        })
    }

    /// Loads an entity by id outside of any explicit transaction.
    pub fn find<E: Entity>(&self, id: i64) -> RepoResult<Option<E>> {
        E::load(&self.conn, id)
    }

    /// Runs `work` in a transaction: commit on success, rollback on error.
    pub fn transactional<T>(
        &mut self,
        work: impl FnOnce(&EntityTransaction<'_>) -> RepoResult<T>,
    ) -> PersistenceResult<T> {
        let tx = self.begin()?;
        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                warn!(
                    "event=tx_work module=persistence status=error unit={} error={}",
                    tx.unit_name, err
                );
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=tx_rollback module=persistence status=error error={}",
                        rollback_err
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Releases the connection. Dropping the manager has the same effect.
    pub fn close(self) {}
}

impl Drop for EntityManager {
    fn drop(&mut self) {
        let remaining = self
            .open_managers
            .fetch_sub(1, Ordering::SeqCst)
            .saturating_sub(1);
        debug!(
            "event=em_close module=persistence status=ok unit={} open={}",
            self.unit_name, remaining
        );
    }
}

/// Active write transaction of an entity manager.
pub struct EntityTransaction<'em> {
    tx: Transaction<'em>,
    unit_name: &'em str,
    started_at: Instant,
}

impl EntityTransaction<'_> {
    /// Makes a transient entity persistent and returns its generated id.
    ///
    /// # Errors
    /// - `RepoError::AlreadyPersistent` when the entity already has an id.
    /// - Validation or database errors from the insert.
    pub fn persist<E: Entity>(&self, entity: &mut E) -> RepoResult<i64> {
        if let Some(id) = entity.id() {
            return Err(RepoError::AlreadyPersistent {
                entity: E::NAME,
                id,
            });
        }
        let id = entity.insert(&self.tx)?;
        debug!(
            "event=persist module=persistence status=ok unit={} entity={} id={}",
            self.unit_name,
            E::NAME,
            id
        );
        Ok(id)
    }

    /// Loads an entity by id, seeing this transaction's uncommitted writes.
    pub fn find<E: Entity>(&self, id: i64) -> RepoResult<Option<E>> {
        E::load(&self.tx, id)
    }

    pub fn connection(&self) -> &Connection {
        &self.tx
    }

    pub fn commit(self) -> PersistenceResult<()> {
        let unit_name = self.unit_name;
        let started_at = self.started_at;
        match self.tx.commit() {
            Ok(()) => {
                info!(
                    "event=tx_commit module=persistence status=ok unit={} duration_ms={}",
                    unit_name,
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=tx_commit module=persistence status=error unit={} error={}",
                    unit_name, err
                );
                Err(err.into())
            }
        }
    }

    pub fn rollback(self) -> PersistenceResult<()> {
        let unit_name = self.unit_name;
        self.tx.rollback()?;
        info!("event=tx_rollback module=persistence status=ok unit={unit_name}");
        Ok(())
    }
}
