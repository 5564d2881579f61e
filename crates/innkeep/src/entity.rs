//! Typed table records.
//!
//! Each table is described by an [`Entity`]: the record type read back from
//! the table, plus a `Fields` type holding exactly the writable columns. The
//! generic [`Store`](crate::Store) turns that description into SQL.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_postgres::Row;
use tokio_postgres::types::{FromSql, ToSql};
use validator::Validate;

use crate::traced::Connection;
use crate::{Error, Result};

/// A row type stored in one table with a `BIGSERIAL` `id` primary key.
pub trait Entity: Serialize + Send + Sync + Sized + 'static {
    /// Table name.
    const TABLE: &'static str;

    /// Human-readable name used in not-found errors.
    const LABEL: &'static str;

    /// Writable columns, in the order [`Entity::params`] yields values.
    const COLUMNS: &'static [&'static str];

    /// Columns filled in by the database (defaults), selected after
    /// [`Entity::COLUMNS`] but never written.
    const READ_ONLY: &'static [&'static str] = &[];

    /// The writable part of a record, validated before every write.
    type Fields: Validate + DeserializeOwned + Serialize + Send + Sync;

    /// Primary key of this record.
    fn id(&self) -> i64;

    /// Decode a row selected as `id` followed by [`Entity::COLUMNS`].
    fn from_row(row: &Row) -> Result<Self>;

    /// Parameter values for [`Entity::COLUMNS`], in order.
    fn params(fields: &Self::Fields) -> Vec<&(dyn ToSql + Sync)>;

    /// Every selected column: `id`, the writable columns, the read-only ones.
    fn select_columns() -> Vec<&'static str> {
        std::iter::once("id")
            .chain(Self::COLUMNS.iter().copied())
            .chain(Self::READ_ONLY.iter().copied())
            .collect()
    }

    /// Uniqueness checks run before a write; `except_id` is the row being
    /// updated, if any. Nothing is written when this fails.
    fn check_unique<C: Connection + ?Sized>(
        _conn: &C,
        _fields: &Self::Fields,
        _except_id: Option<i64>,
    ) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    /// Translate a unique-constraint violation raised by a write into a
    /// domain error. `None` keeps the raw Postgres error.
    fn unique_violation(_constraint: &str, _fields: &Self::Fields) -> Option<Error> {
        None
    }
}

/// An entity hanging off a property through a `property_id` column.
pub trait PropertyScoped: Entity {
    fn property_id(&self) -> i64;
}

/// An entity that holds at most one row per property.
pub trait OnePerProperty: PropertyScoped {}

/// Read a named column, reporting which table/column failed to decode.
pub(crate) fn column<'r, T: FromSql<'r>>(
    row: &'r Row,
    table: &'static str,
    name: &'static str,
) -> Result<T> {
    row.try_get(name).map_err(|e| Error::ColumnRead {
        table,
        column: name,
        message: e.to_string(),
    })
}

/// Declares a closed enum stored as TEXT, with serde, `FromStr`, `Display`,
/// `ToSql` and `FromSql` implementations that all use the same spelling.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        concat!("unknown ", stringify!($name), " {:?}"),
                        other
                    )),
                }
            }
        }

        impl tokio_postgres::types::ToSql for $name {
            fn to_sql(
                &self,
                ty: &tokio_postgres::types::Type,
                out: &mut bytes::BytesMut,
            ) -> std::result::Result<
                tokio_postgres::types::IsNull,
                Box<dyn std::error::Error + Sync + Send>,
            > {
                tokio_postgres::types::ToSql::to_sql(&self.as_str(), ty, out)
            }

            fn accepts(ty: &tokio_postgres::types::Type) -> bool {
                <&str as tokio_postgres::types::ToSql>::accepts(ty)
            }

            tokio_postgres::types::to_sql_checked!();
        }

        impl<'a> tokio_postgres::types::FromSql<'a> for $name {
            fn from_sql(
                ty: &tokio_postgres::types::Type,
                raw: &'a [u8],
            ) -> std::result::Result<Self, Box<dyn std::error::Error + Sync + Send>> {
                let text = <&str as tokio_postgres::types::FromSql>::from_sql(ty, raw)?;
                Ok(text.parse()?)
            }

            fn accepts(ty: &tokio_postgres::types::Type) -> bool {
                <&str as tokio_postgres::types::FromSql>::accepts(ty)
            }
        }
    };
}

pub(crate) use text_enum;
