//! Persistence context: entity manager factory, entity managers and
//! transactions over one persistence unit.
//!
//! # Responsibility
//! - Turn a configured persistence unit into ready SQLite connections.
//! - Scope entity writes to explicit transactions.
//!
//! # Invariants
//! - Every entity manager is released exactly once, on `close` or on drop.
//! - A transaction that is neither committed nor rolled back is rolled back
//!   when dropped.

mod entity;
mod factory;
mod manager;

pub use entity::Entity;
pub use factory::EntityManagerFactory;
pub use manager::{EntityManager, EntityTransaction};

use crate::config::ConfigError;
use crate::db::DbError;
use crate::repo::error::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Failures raised while managing persistence contexts.
#[derive(Debug)]
pub enum PersistenceError {
    Config(ConfigError),
    Db(DbError),
    Repo(RepoError),
    UnknownUnit(String),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::UnknownUnit(name) => write!(f, "no persistence unit named `{name}`"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::UnknownUnit(_) => None,
        }
    }
}

impl From<ConfigError> for PersistenceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for PersistenceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for PersistenceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
