//! SQLite storage bootstrap, pooling and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the task store.
//! - Apply schema migrations in deterministic order.
//! - Hand out r2d2-pooled connections with scoped release.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No task data is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod pool;

pub use open::{open_db, open_db_in_memory};
pub use pool::{ConnectionPool, DbTarget, PooledConnection, DEFAULT_POOL_SIZE};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// The pool could not be built.
    Pool(r2d2::Error),
    /// No pooled connection became available in time.
    PoolTimeout {
        waited_ms: u128,
        source: r2d2::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Pool(err) => write!(f, "failed to build connection pool: {err}"),
            Self::PoolTimeout { waited_ms, source } => {
                write!(
                    f,
                    "no database connection available after {waited_ms}ms: {source}"
                )
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) | Self::PoolTimeout { source: err, .. } => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
