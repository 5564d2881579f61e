//! Accounts: registration, credential checks and profile edits.
//!
//! Passwords are stored as argon2 PHC strings. No tokens are issued here;
//! a successful [`Accounts::login`] just returns the user.

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::{User, UserFields, UserRole};
use crate::store::Store;
use crate::traced::Connection;
use crate::{Error, Result};

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: u64 = 8;

/// A registration request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Registration {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(length(min = MIN_PASSWORD_LEN))]
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

/// Login credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The editable part of an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}

pub(crate) fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| Error::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Account operations on top of the `app_user` store.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accounts {
    store: Store<User>,
}

impl Accounts {
    pub const fn new() -> Self {
        Self { store: Store::new() }
    }

    /// Create an account and return its id. A taken email is rejected with
    /// [`Error::DuplicateEmail`].
    #[tracing::instrument(skip(self, conn, registration), fields(email = %registration.email))]
    pub async fn register<C: Connection + ?Sized>(
        &self,
        conn: &C,
        registration: &Registration,
    ) -> Result<i64> {
        registration.validate()?;
        let fields = UserFields {
            name: registration.name.clone(),
            email: registration.email.trim().to_lowercase(),
            phone: registration.phone.clone(),
            role: registration.role,
            password_hash: hash_password(&registration.password)?,
        };
        self.store.create(conn, &fields).await
    }

    /// Check credentials. Unknown email and wrong password are the same
    /// [`Error::InvalidCredentials`].
    #[tracing::instrument(skip(self, conn, credentials), fields(email = %credentials.email))]
    pub async fn login<C: Connection + ?Sized>(&self, conn: &C, credentials: &Credentials) -> Result<User> {
        let email = credentials.email.trim().to_lowercase();
        let mut users = self.store.list_where(conn, "email", &email).await?;
        let Some(user) = users.pop() else {
            return Err(Error::InvalidCredentials);
        };
        if !verify_password(&credentials.password, &user.password_hash)? {
            return Err(Error::InvalidCredentials);
        }
        Ok(user)
    }

    pub async fn get_all<C: Connection + ?Sized>(&self, conn: &C) -> Result<Vec<User>> {
        self.store.get_all(conn).await
    }

    pub async fn get_by_id<C: Connection + ?Sized>(&self, conn: &C, id: i64) -> Result<Option<User>> {
        self.store.get_by_id(conn, id).await
    }

    /// Change name, phone and/or role. Email and password stay as they are.
    pub async fn update<C: Connection + ?Sized>(
        &self,
        conn: &C,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<User> {
        let user = self.store.fetch(conn, id).await?;
        let mut fields = user.fields();
        if let Some(name) = update.name {
            fields.name = name;
        }
        if update.phone.is_some() {
            fields.phone = update.phone;
        }
        if let Some(role) = update.role {
            fields.role = role;
        }
        self.store.update(conn, id, &fields).await?;
        self.store.fetch(conn, id).await
    }

    pub async fn remove<C: Connection + ?Sized>(&self, conn: &C, id: i64) -> Result<u64> {
        self.store.remove(conn, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("x", "not a phc string"),
            Err(Error::PasswordHash(_))
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        let registration: Registration = serde_json::from_str(
            r#"{"name":"Asha","email":"asha@example.com","password":"short"}"#,
        )
        .unwrap();
        assert_eq!(registration.role, UserRole::Guest);
        let err = Error::from(registration.validate().unwrap_err());
        assert!(matches!(err, Error::Validation { fields } if fields == ["password"]));
    }
}
