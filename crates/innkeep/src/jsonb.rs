//! JSONB column type for PostgreSQL.
//!
//! Use `Jsonb<T>` to store structured data as JSONB. `T` goes through
//! `serde_json` on the way in and out.
//!
//! ```ignore
//! use innkeep::Jsonb;
//!
//! struct RoomPricing {
//!     id: i64,
//!     // Stored as JSONB, typed as a list of tiers
//!     refund_tiers: Jsonb<Vec<RefundTier>>,
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::ops::Deref;

use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type};

/// Leading byte of every binary `JSONB` value.
const JSONB_VERSION: u8 = 1;

/// A value stored in a `JSON`/`JSONB` column.
///
/// Serializes transparently, so a `Jsonb<Vec<T>>` field appears as a plain
/// JSON array in API payloads.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jsonb<T>(pub T);

impl<T> Deref for Jsonb<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Jsonb<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn is_json(ty: &Type) -> bool {
    *ty == Type::JSON || *ty == Type::JSONB
}

impl<'a, T: DeserializeOwned> FromSql<'a> for Jsonb<T> {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let json = if *ty == Type::JSONB {
            match raw.split_first() {
                Some((&JSONB_VERSION, rest)) => rest,
                Some((version, _)) => {
                    return Err(format!("unsupported JSONB version {version}").into());
                }
                None => return Err("empty JSONB value".into()),
            }
        } else {
            raw
        };
        Ok(Jsonb(serde_json::from_slice(json)?))
    }

    fn accepts(ty: &Type) -> bool {
        is_json(ty)
    }
}

impl<T: Serialize + fmt::Debug> ToSql for Jsonb<T> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        if *ty == Type::JSONB {
            out.put_u8(JSONB_VERSION);
        }
        serde_json::to_writer(out.writer(), &self.0)?;
        Ok(IsNull::No)
    }

    fn accepts(ty: &Type) -> bool {
        is_json(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Tier {
        days: i32,
        percent: i32,
    }

    #[test]
    fn test_jsonb_prefixes_version_byte() {
        let value = Jsonb(vec![Tier { days: 7, percent: 100 }]);
        let mut out = BytesMut::new();
        value.to_sql(&Type::JSONB, &mut out).unwrap();
        assert_eq!(out[0], JSONB_VERSION);
        assert_eq!(&out[1..], br#"[{"days":7,"percent":100}]"#);
    }

    #[test]
    fn test_json_has_no_version_byte() {
        let value = Jsonb(Tier { days: 1, percent: 0 });
        let mut out = BytesMut::new();
        value.to_sql(&Type::JSON, &mut out).unwrap();
        assert_eq!(&out[..], br#"{"days":1,"percent":0}"#);
    }

    #[test]
    fn test_jsonb_reads_back() {
        let raw = b"\x01[{\"days\":3,\"percent\":50}]";
        let value: Jsonb<Vec<Tier>> = Jsonb::from_sql(&Type::JSONB, raw).unwrap();
        assert_eq!(value.0, vec![Tier { days: 3, percent: 50 }]);
    }

    #[test]
    fn test_jsonb_rejects_unknown_version() {
        let raw = b"\x02{}";
        let result: Result<Jsonb<serde_json::Value>, _> = Jsonb::from_sql(&Type::JSONB, raw);
        assert!(result.is_err());
    }
}
