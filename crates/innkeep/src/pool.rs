//! Connection pool.

use std::ops::{Deref, DerefMut};

use deadpool_postgres::{ManagerConfig, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::{IsolationLevel, NoTls};

use crate::Result;

/// A `deadpool_postgres` pool handing out [`PooledConn`]s.
///
/// # Example
///
/// ```ignore
/// let pool = Pool::connect(&config.database_url, config.pool_size)?;
/// let conn = pool.get().await?;
/// let rows = Store::<Location>::new().get_all(&conn).await?;
/// ```
#[derive(Clone)]
pub struct Pool {
    inner: deadpool_postgres::Pool,
}

impl Pool {
    /// Build a pool for `database_url`. Connections are opened lazily.
    pub fn connect(database_url: &str, max_size: usize) -> Result<Self> {
        let mut config = deadpool_postgres::Config::new();
        config.url = Some(database_url.to_string());
        config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        config.pool = Some(PoolConfig::new(max_size));

        let inner = config.create_pool(Some(Runtime::Tokio1), NoTls)?;
        Ok(Self { inner })
    }

    /// Get a connection from the pool.
    pub async fn get(&self) -> Result<PooledConn> {
        let inner = self.inner.get().await?;
        Ok(PooledConn { inner })
    }
}

/// A pooled connection, returned to the pool on drop.
pub struct PooledConn {
    inner: deadpool_postgres::Object,
}

impl PooledConn {
    /// Start a read-write transaction. It rolls back on drop unless committed.
    pub async fn transaction(&mut self) -> Result<deadpool_postgres::Transaction<'_>> {
        Ok(self.inner.transaction().await?)
    }

    /// Start a read-only, repeatable-read transaction, so a multi-table read
    /// sees one snapshot.
    pub async fn snapshot(&mut self) -> Result<deadpool_postgres::Transaction<'_>> {
        Ok(self
            .inner
            .build_transaction()
            .isolation_level(IsolationLevel::RepeatableRead)
            .read_only(true)
            .start()
            .await?)
    }
}

impl Deref for PooledConn {
    type Target = deadpool_postgres::Object;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PooledConn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
