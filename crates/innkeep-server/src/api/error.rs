use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::envelope::Envelope;
use super::upload::UploadError;

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] innkeep::Error),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("no route for {0}")]
    NoRoute(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        match rejection {
            JsonRejection::JsonDataError(_) => match missing_field(&text) {
                Some(field) => ApiError::Store(innkeep::Error::Validation {
                    fields: vec![field.to_string()],
                }),
                None => ApiError::BadRequest(text),
            },
            _ => ApiError::BadRequest(text),
        }
    }
}

/// The field name in serde's "missing field `name`" message.
fn missing_field(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once("missing field `")?;
    rest.split_once('`').map(|(field, _)| field)
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Store(errors.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        use innkeep::Error as E;
        match self {
            ApiError::Store(E::Validation { .. } | E::DuplicatePropertyName(_) | E::DuplicateEmail(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(E::NotFound { .. }) | ApiError::NoRoute(_) => StatusCode::NOT_FOUND,
            ApiError::Store(E::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upload(UploadError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upload(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Offending fields for the validation class of errors.
    pub fn fields(&self) -> Option<Vec<&str>> {
        use innkeep::Error as E;
        match self {
            ApiError::Store(E::Validation { fields }) => Some(fields.iter().map(String::as_str).collect()),
            ApiError::Store(E::DuplicatePropertyName(_)) => Some(vec!["property_name"]),
            ApiError::Store(E::DuplicateEmail(_)) => Some(vec!["email"]),
            _ => None,
        }
    }

    /// Value of the envelope's `error` field.
    pub fn code(&self) -> &'static str {
        use innkeep::Error as E;
        match self {
            ApiError::Store(E::Validation { .. }) => "validation",
            ApiError::Store(E::DuplicatePropertyName(_)) => "duplicate_property_name",
            ApiError::Store(E::DuplicateEmail(_)) => "duplicate_email",
            ApiError::Store(E::NotFound { .. }) | ApiError::NoRoute(_) => "not_found",
            ApiError::Store(E::InvalidCredentials) => "invalid_credentials",
            ApiError::Store(_) => "internal",
            ApiError::Upload(UploadError::TooLarge { .. }) => "file_too_large",
            ApiError::Upload(UploadError::UnsupportedType(_)) => "unsupported_type",
            ApiError::Upload(UploadError::MissingFile) => "missing_file",
            ApiError::Upload(UploadError::Io(_)) => "internal",
            ApiError::Upload(_) | ApiError::BadRequest(_) => "bad_request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        let mut body = Envelope::failure(self.code(), self.to_string());
        if let Some(fields) = self.fields() {
            body.data = Some(serde_json::json!({ "fields": fields }));
        }
        (status, body).into_response()
    }
}
