//! Entity stores.
//!
//! A [`Store`] is the single-table CRUD unit: every operation validates its
//! input (for writes), renders one statement and runs it on whatever
//! [`Connection`] it is handed. Nothing is retried and no store opens a
//! transaction; callers that need several statements to commit together pass
//! in a transaction.

use std::marker::PhantomData;

use innkeep_sql::{Condition, DeleteStmt, InsertStmt, SelectStmt, UpdateStmt, render};
use tokio_postgres::types::ToSql;
use validator::Validate;

use crate::entity::{Entity, OnePerProperty, PropertyScoped};
use crate::error::unique_violation;
use crate::traced::{Connection, ConnectionExt};
use crate::{Error, Result};

/// Map a write error through the entity's unique-violation translation.
fn write_error<E: Entity>(err: tokio_postgres::Error, fields: &E::Fields) -> Error {
    unique_violation(&err)
        .and_then(|constraint| E::unique_violation(constraint, fields))
        .unwrap_or(Error::Postgres(err))
}

/// CRUD access to the table behind `E`.
pub struct Store<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E> Default for Store<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Store<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Store<{}>", std::any::type_name::<E>())
    }
}

impl<E> Clone for Store<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Store<E> {}

impl<E> Store<E> {
    pub const fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Store<E> {
    /// Insert a row and return its generated id.
    pub async fn create<C: Connection + ?Sized>(&self, conn: &C, fields: &E::Fields) -> Result<i64> {
        fields.validate()?;
        E::check_unique(conn, fields, None).await?;
        let sql = render(
            &InsertStmt::new(E::TABLE)
                .columns(E::COLUMNS.iter().copied())
                .returning(["id"]),
        );
        let row = conn
            .traced(E::TABLE)
            .query_one(&sql, &E::params(fields))
            .await
            .map_err(|e| write_error::<E>(e, fields))?;
        Ok(row.try_get(0)?)
    }

    /// Every row of the table, ordered by id. No pagination.
    pub async fn get_all<C: Connection + ?Sized>(&self, conn: &C) -> Result<Vec<E>> {
        let sql = render(
            &SelectStmt::new(E::TABLE)
                .columns(E::select_columns())
                .order_by("id"),
        );
        let rows = conn.traced(E::TABLE).query(&sql, &[]).await?;
        rows.iter().map(E::from_row).collect()
    }

    /// Point lookup by primary key.
    pub async fn get_by_id<C: Connection + ?Sized>(&self, conn: &C, id: i64) -> Result<Option<E>> {
        let sql = render(
            &SelectStmt::new(E::TABLE)
                .columns(E::select_columns())
                .where_(Condition::eq("id")),
        );
        let row = conn.traced(E::TABLE).query_opt(&sql, &[&id]).await?;
        row.as_ref().map(E::from_row).transpose()
    }

    /// Like [`Store::get_by_id`], but a missing row is an error.
    pub async fn fetch<C: Connection + ?Sized>(&self, conn: &C, id: i64) -> Result<E> {
        self.get_by_id(conn, id).await?.ok_or(Error::NotFound {
            entity: E::LABEL,
            id,
        })
    }

    /// Overwrite every writable column of row `id`. Returns the affected count.
    pub async fn update<C: Connection + ?Sized>(
        &self,
        conn: &C,
        id: i64,
        fields: &E::Fields,
    ) -> Result<u64> {
        fields.validate()?;
        E::check_unique(conn, fields, Some(id)).await?;
        let sql = render(
            &UpdateStmt::new(E::TABLE)
                .set(E::COLUMNS.iter().copied())
                .where_(Condition::eq("id")),
        );
        let mut params = E::params(fields);
        params.push(&id);
        conn.traced(E::TABLE)
            .execute(&sql, &params)
            .await
            .map_err(|e| write_error::<E>(e, fields))
    }

    /// Hard delete of row `id`. Dependent rows are not checked.
    pub async fn remove<C: Connection + ?Sized>(&self, conn: &C, id: i64) -> Result<u64> {
        let sql = render(&DeleteStmt::new(E::TABLE).where_(Condition::eq("id")));
        Ok(conn.traced(E::TABLE).execute(&sql, &[&id]).await?)
    }

    /// Rows where `column = value`, ordered by id.
    pub(crate) async fn list_where<C: Connection + ?Sized>(
        &self,
        conn: &C,
        column: &str,
        value: &(dyn ToSql + Sync),
    ) -> Result<Vec<E>> {
        let sql = render(
            &SelectStmt::new(E::TABLE)
                .columns(E::select_columns())
                .where_(Condition::eq(column))
                .order_by("id"),
        );
        let rows = conn.traced(E::TABLE).query(&sql, &[value]).await?;
        rows.iter().map(E::from_row).collect()
    }

    /// Delete rows where `column = value`.
    pub(crate) async fn remove_where<C: Connection + ?Sized>(
        &self,
        conn: &C,
        column: &str,
        value: &(dyn ToSql + Sync),
    ) -> Result<u64> {
        let sql = render(&DeleteStmt::new(E::TABLE).where_(Condition::eq(column)));
        Ok(conn.traced(E::TABLE).execute(&sql, &[value]).await?)
    }

    /// Whether any row has `column = value`, ignoring row `except_id`.
    pub(crate) async fn exists_where<C: Connection + ?Sized>(
        &self,
        conn: &C,
        column: &str,
        value: &(dyn ToSql + Sync),
        except_id: Option<i64>,
    ) -> Result<bool> {
        let mut stmt = SelectStmt::new(E::TABLE).where_(Condition::eq(column));
        let mut params: Vec<&(dyn ToSql + Sync)> = vec![value];
        if let Some(id) = except_id.as_ref() {
            stmt = stmt.where_(Condition::not_eq("id"));
            params.push(id);
        }
        let sql = render(&stmt.exists());
        let row = conn.traced(E::TABLE).query_one(&sql, &params).await?;
        Ok(row.try_get(0)?)
    }
}

impl<E: PropertyScoped> Store<E> {
    /// Every row belonging to a property, ordered by id.
    pub async fn list_for_property<C: Connection + ?Sized>(
        &self,
        conn: &C,
        property_id: i64,
    ) -> Result<Vec<E>> {
        self.list_where(conn, "property_id", &property_id).await
    }

    /// Delete every row belonging to a property.
    pub async fn remove_for_property<C: Connection + ?Sized>(
        &self,
        conn: &C,
        property_id: i64,
    ) -> Result<u64> {
        self.remove_where(conn, "property_id", &property_id).await
    }
}

impl<E: OnePerProperty> Store<E> {
    /// The property's row, if it has one.
    pub async fn find_for_property<C: Connection + ?Sized>(
        &self,
        conn: &C,
        property_id: i64,
    ) -> Result<Option<E>> {
        let sql = render(
            &SelectStmt::new(E::TABLE)
                .columns(E::select_columns())
                .where_(Condition::eq("property_id"))
                .order_by("id")
                .limit(1),
        );
        let row = conn.traced(E::TABLE).query_opt(&sql, &[&property_id]).await?;
        row.as_ref().map(E::from_row).transpose()
    }

    /// Update the property's row in place, or insert one if it has none.
    /// Returns the row id.
    pub async fn upsert_for_property<C: Connection + ?Sized>(
        &self,
        conn: &C,
        property_id: i64,
        fields: &E::Fields,
    ) -> Result<i64> {
        match self.find_for_property(conn, property_id).await? {
            Some(existing) => {
                let id = existing.id();
                self.update(conn, id, fields).await?;
                Ok(id)
            }
            None => self.create(conn, fields).await,
        }
    }
}
