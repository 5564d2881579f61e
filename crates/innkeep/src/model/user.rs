use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use validator::Validate;

use super::check::not_blank;
use crate::entity::{Entity, column, text_enum};
use crate::error::USER_EMAIL_CONSTRAINT;
use crate::store::Store;
use crate::traced::Connection;
use crate::{Error, Result};

text_enum! {
    pub enum UserRole {
        Guest => "guest",
        Host => "host",
        Admin => "admin",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Guest
    }
}

/// An account. The password hash is kept for credential checks but never
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct UserFields {
    #[validate(custom(function = "not_blank"), length(max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(skip_serializing)]
    #[validate(custom(function = "not_blank"))]
    pub password_hash: String,
}

impl User {
    pub fn fields(&self) -> UserFields {
        UserFields {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role,
            password_hash: self.password_hash.clone(),
        }
    }
}

impl Entity for User {
    const TABLE: &'static str = "app_user";
    const LABEL: &'static str = "user";
    const COLUMNS: &'static [&'static str] = &["name", "email", "phone", "role", "password_hash"];
    const READ_ONLY: &'static [&'static str] = &["created_at"];

    type Fields = UserFields;

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, Self::TABLE, "id")?,
            name: column(row, Self::TABLE, "name")?,
            email: column(row, Self::TABLE, "email")?,
            phone: column(row, Self::TABLE, "phone")?,
            role: column(row, Self::TABLE, "role")?,
            password_hash: column(row, Self::TABLE, "password_hash")?,
            created_at: column(row, Self::TABLE, "created_at")?,
        })
    }

    fn params(fields: &UserFields) -> Vec<&(dyn ToSql + Sync)> {
        vec![
            &fields.name as &(dyn ToSql + Sync),
            &fields.email,
            &fields.phone,
            &fields.role,
            &fields.password_hash,
        ]
    }

    async fn check_unique<C: Connection + ?Sized>(
        conn: &C,
        fields: &UserFields,
        except_id: Option<i64>,
    ) -> Result<()> {
        let taken = Store::<User>::new()
            .exists_where(conn, "email", &fields.email, except_id)
            .await?;
        if taken {
            return Err(Error::DuplicateEmail(fields.email.clone()));
        }
        Ok(())
    }

    fn unique_violation(constraint: &str, fields: &UserFields) -> Option<Error> {
        (constraint == USER_EMAIL_CONSTRAINT).then(|| Error::DuplicateEmail(fields.email.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_never_serialized() {
        let user = User {
            id: 1,
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: None,
            role: UserRole::Host,
            password_hash: "$argon2id$v=19$secret".into(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains(r#""role":"host""#));

        let fields = serde_json::to_value(user.fields()).unwrap();
        assert!(fields.get("password_hash").is_none());
    }
}
