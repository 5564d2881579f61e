use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("failed to create connection pool: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    #[error("invalid fields: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    #[error("a property named {0:?} already exists")]
    DuplicatePropertyName(String),

    #[error("an account with email {0:?} already exists")]
    DuplicateEmail(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("failed to read column {table}.{column}: {message}")]
    ColumnRead {
        table: &'static str,
        column: &'static str,
        message: String,
    },

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("migration {version} failed: {message}")]
    Migration { version: &'static str, message: String },
}

impl Error {
    /// True for errors caused by the caller's input rather than the backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. }
                | Error::DuplicatePropertyName(_)
                | Error::DuplicateEmail(_)
                | Error::InvalidCredentials
                | Error::NotFound { .. }
        )
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        for (key, kind) in errors.errors() {
            match kind {
                // Struct-level checks name the offending field in the error code.
                validator::ValidationErrorsKind::Field(list) if *key == "__all__" => {
                    fields.extend(list.iter().map(|e| e.code.to_string()));
                }
                _ => fields.push(key.to_string()),
            }
        }
        fields.sort();
        fields.dedup();
        Error::Validation { fields }
    }
}

/// Name of the unique constraint on `basic_info.property_name`.
pub(crate) const PROPERTY_NAME_CONSTRAINT: &str = "basic_info_property_name_key";

/// Name of the unique constraint on `app_user.email`.
pub(crate) const USER_EMAIL_CONSTRAINT: &str = "app_user_email_key";

/// Returns the violated constraint's name if `err` is a unique violation.
pub(crate) fn unique_violation(err: &tokio_postgres::Error) -> Option<&str> {
    let db = err.as_db_error()?;
    if *db.code() == tokio_postgres::error::SqlState::UNIQUE_VIOLATION {
        db.constraint()
    } else {
        None
    }
}
