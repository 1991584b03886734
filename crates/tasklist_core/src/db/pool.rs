//! r2d2 pool of bootstrapped SQLite connections.
//!
//! # Responsibility
//! - Reuse migrated connections across store operations.
//! - Run busy-timeout setup and migrations on every newly opened connection.
//!
//! # Invariants
//! - In-memory targets hold exactly one connection that is never recycled;
//!   each in-memory SQLite connection is its own database.
//! - File targets are opened once through `open_db` before the pool is built,
//!   so schema errors surface as typed `DbError`s.

use super::open::{bootstrap_connection, open_db};
use super::{DbError, DbResult};
use log::{debug, warn};
use r2d2::{CustomizeConnection, Pool};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub const DEFAULT_POOL_SIZE: usize = 4;
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection checked out of a `ConnectionPool`; returned on drop.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Where pooled connections point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    File(PathBuf),
    Memory,
}

#[derive(Debug)]
struct Bootstrap;

impl CustomizeConnection<Connection, rusqlite::Error> for Bootstrap {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        bootstrap_connection(conn).map_err(|err| match err {
            DbError::Sqlite(err) => err,
            other => rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(other.to_string()),
            ),
        })
    }
}

/// Connection pool shared by reference across repositories.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    target: DbTarget,
    inner: Pool<SqliteConnectionManager>,
}

impl ConnectionPool {
    /// Creates a pool for `target` holding up to `max_size` connections.
    pub fn new(target: DbTarget, max_size: usize) -> DbResult<Self> {
        Self::with_acquire_timeout(target, max_size, DEFAULT_ACQUIRE_TIMEOUT)
    }

    /// Single-connection in-memory pool.
    pub fn in_memory() -> DbResult<Self> {
        Self::new(DbTarget::Memory, 1)
    }

    /// Like `new`, with a custom wait for a free connection.
    pub fn with_acquire_timeout(
        target: DbTarget,
        max_size: usize,
        timeout: Duration,
    ) -> DbResult<Self> {
        let builder = Pool::builder()
            .connection_timeout(timeout)
            .min_idle(Some(1))
            .connection_customizer(Box::new(Bootstrap));

        let (builder, manager) = match &target {
            DbTarget::Memory => (
                builder
                    .max_size(1)
                    .idle_timeout(None)
                    .max_lifetime(None),
                SqliteConnectionManager::memory(),
            ),
            DbTarget::File(path) => {
                drop(open_db(path)?);
                (
                    builder.max_size(to_pool_size(max_size)),
                    SqliteConnectionManager::file(path),
                )
            }
        };
        let inner = builder.build(manager).map_err(DbError::Pool)?;

        debug!(
            "event=db_pool_init module=db status=ok mode={} max_size={}",
            target_mode(&target),
            inner.max_size()
        );
        Ok(Self { target, inner })
    }

    pub fn target(&self) -> &DbTarget {
        &self.target
    }

    pub fn max_size(&self) -> usize {
        self.inner.max_size() as usize
    }

    /// Number of connections currently parked in the pool.
    pub fn idle_count(&self) -> usize {
        self.inner.state().idle_connections as usize
    }

    /// Checks out one connection, waiting up to the acquire timeout.
    pub fn acquire(&self) -> DbResult<PooledConnection> {
        let started_at = Instant::now();
        self.inner.get().map_err(|err| {
            let waited_ms = started_at.elapsed().as_millis();
            warn!("event=db_pool_acquire module=db status=timeout waited_ms={waited_ms} error={err}");
            DbError::PoolTimeout {
                waited_ms,
                source: err,
            }
        })
    }
}

fn to_pool_size(max_size: usize) -> u32 {
    u32::try_from(max_size.max(1)).unwrap_or(u32::MAX)
}

fn target_mode(target: &DbTarget) -> &'static str {
    match target {
        DbTarget::File(_) => "file",
        DbTarget::Memory => "memory",
    }
}
