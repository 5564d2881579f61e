//! Statement tracing.
//!
//! Stores never talk to a client directly: they go through
//! [`ConnectionExt::traced`], which opens a `db.query` or `db.execute` debug
//! span per statement with the table, the SQL, the parameter count and the
//! rows returned or affected.

use innkeep_sql::RenderedSql;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Error, GenericClient, Row};
use tracing::Instrument;
use tracing::field::Empty;

/// Something stores can run statements on: a plain client, a pooled
/// connection or an open transaction.
pub trait Connection: Send + Sync {
    type Client: GenericClient + Sync;

    fn client(&self) -> &Self::Client;
}

impl Connection for tokio_postgres::Client {
    type Client = Self;

    fn client(&self) -> &Self {
        self
    }
}

impl Connection for tokio_postgres::Transaction<'_> {
    type Client = Self;

    fn client(&self) -> &Self {
        self
    }
}

impl Connection for deadpool_postgres::Object {
    type Client = tokio_postgres::Client;

    fn client(&self) -> &tokio_postgres::Client {
        self
    }
}

impl<'a> Connection for deadpool_postgres::Transaction<'a> {
    type Client = tokio_postgres::Transaction<'a>;

    fn client(&self) -> &tokio_postgres::Transaction<'a> {
        self
    }
}

impl Connection for crate::pool::PooledConn {
    type Client = tokio_postgres::Client;

    fn client(&self) -> &tokio_postgres::Client {
        self
    }
}

/// A connection bound to one table for logging.
pub struct TracedConn<'a, C: Connection + ?Sized> {
    conn: &'a C,
    table: &'static str,
}

impl<'a, C: Connection + ?Sized> TracedConn<'a, C> {
    pub fn new(conn: &'a C, table: &'static str) -> Self {
        Self { conn, table }
    }

    /// Run a statement that returns no rows. Returns the affected count.
    pub async fn execute(&self, stmt: &RenderedSql, params: &[&(dyn ToSql + Sync)]) -> Result<u64, Error> {
        debug_assert_eq!(params.len(), stmt.param_count, "{}", stmt.sql);
        let span = tracing::debug_span!(
            "db.execute",
            table = self.table,
            sql = %stmt.sql,
            params = params.len(),
            affected = Empty,
        );
        let affected = self
            .conn
            .client()
            .execute(stmt.sql.as_str(), params)
            .instrument(span.clone())
            .await?;
        span.record("affected", affected);
        Ok(affected)
    }

    pub async fn query(&self, stmt: &RenderedSql, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>, Error> {
        let span = self.query_span(stmt, params);
        let rows = self
            .conn
            .client()
            .query(stmt.sql.as_str(), params)
            .instrument(span.clone())
            .await?;
        span.record("rows", rows.len());
        Ok(rows)
    }

    pub async fn query_opt(
        &self,
        stmt: &RenderedSql,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Error> {
        let span = self.query_span(stmt, params);
        let row = self
            .conn
            .client()
            .query_opt(stmt.sql.as_str(), params)
            .instrument(span.clone())
            .await?;
        span.record("rows", usize::from(row.is_some()));
        Ok(row)
    }

    /// Exactly one row, or an error.
    pub async fn query_one(&self, stmt: &RenderedSql, params: &[&(dyn ToSql + Sync)]) -> Result<Row, Error> {
        let span = self.query_span(stmt, params);
        let row = self
            .conn
            .client()
            .query_one(stmt.sql.as_str(), params)
            .instrument(span.clone())
            .await?;
        span.record("rows", 1);
        Ok(row)
    }

    fn query_span(&self, stmt: &RenderedSql, params: &[&(dyn ToSql + Sync)]) -> tracing::Span {
        debug_assert_eq!(params.len(), stmt.param_count, "{}", stmt.sql);
        tracing::debug_span!(
            "db.query",
            table = self.table,
            sql = %stmt.sql,
            params = params.len(),
            rows = Empty,
        )
    }
}

pub trait ConnectionExt: Connection {
    /// Wrap this connection for statements against `table`.
    fn traced(&self, table: &'static str) -> TracedConn<'_, Self> {
        TracedConn::new(self, table)
    }
}

impl<C: Connection + ?Sized> ConnectionExt for C {}
