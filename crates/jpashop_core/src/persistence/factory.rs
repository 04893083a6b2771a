//! Entity manager factory bound to one persistence unit.
//!
//! # Invariants
//! - Creating the factory opens the unit's database and applies migrations,
//!   so schema problems surface before any entity manager exists.
//! - In-memory units keep an anchor connection open for the factory's
//!   lifetime; every entity manager of the factory sees the same database.

use super::manager::EntityManager;
use super::{PersistenceError, PersistenceResult};
use crate::config::{DataSource, PersistenceConfig, PersistenceUnit};
use crate::db::{open_db, open_db_shared_memory};
use log::{info, warn};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

static MEMORY_DB_SEQUENCE: AtomicU64 = AtomicU64::new(0);

enum ConnectionTarget {
    File(PathBuf),
    SharedMemory(String),
}

/// Creates entity managers for one persistence unit.
pub struct EntityManagerFactory {
    unit: PersistenceUnit,
    target: ConnectionTarget,
    _anchor: Option<Connection>,
    open_managers: Arc<AtomicUsize>,
}

impl EntityManagerFactory {
    /// Opens the unit's database and prepares the factory.
    ///
    /// # Errors
    /// - Returns `PersistenceError::Db` when the database cannot be opened or
    ///   migrated.
    pub fn create(unit: &PersistenceUnit) -> PersistenceResult<Self> {
        let started_at = Instant::now();
        let (target, anchor) = match &unit.data_source {
            DataSource::File { path } => {
                // Opening once applies migrations; managers reopen on demand.
                drop(open_db(path)?);
                (ConnectionTarget::File(path.clone()), None)
            }
            DataSource::Memory => {
                let name = shared_memory_name(&unit.name);
                let anchor = open_db_shared_memory(&name)?;
                (ConnectionTarget::SharedMemory(name), Some(anchor))
            }
        };

        info!(
            "event=emf_create module=persistence status=ok unit={} duration_ms={}",
            unit.name,
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            unit: unit.clone(),
            target,
            _anchor: anchor,
            open_managers: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Creates a factory for the unit named `unit_name` in `config`.
    pub fn from_config(config: &PersistenceConfig, unit_name: &str) -> PersistenceResult<Self> {
        let unit = config
            .unit(unit_name)
            .ok_or_else(|| PersistenceError::UnknownUnit(unit_name.to_string()))?;
        Self::create(unit)
    }

    pub fn unit(&self) -> &PersistenceUnit {
        &self.unit
    }

    /// Opens a new entity manager with its own connection.
    pub fn create_entity_manager(&self) -> PersistenceResult<EntityManager> {
        let mut conn = match &self.target {
            ConnectionTarget::File(path) => open_db(path)?,
            ConnectionTarget::SharedMemory(name) => open_db_shared_memory(name)?,
        };
        if self.unit.show_sql {
            conn.trace(Some(log_sql as fn(&str)));
        }

        Ok(EntityManager::new(
            conn,
            self.unit.name.clone(),
            Arc::clone(&self.open_managers),
        ))
    }

    /// Number of entity managers created by this factory and not yet released.
    pub fn open_entity_managers(&self) -> usize {
        self.open_managers.load(Ordering::SeqCst)
    }

    /// Releases the factory and, for in-memory units, the database itself.
    pub fn close(self) {
        let open = self.open_entity_managers();
        if open > 0 {
            warn!(
                "event=emf_close module=persistence status=warn unit={} open_entity_managers={}",
                self.unit.name, open
            );
        } else {
            info!(
                "event=emf_close module=persistence status=ok unit={}",
                self.unit.name
            );
        }
    }
}

fn shared_memory_name(unit_name: &str) -> String {
    let sanitized: String = unit_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!(
        "jpashop-{sanitized}-{}-{}",
        std::process::id(),
        MEMORY_DB_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    )
}

fn log_sql(sql: &str) {
    info!("event=sql module=persistence sql={}", sql.replace('\n', " "));
}
