//! Error handler for saucery.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::{Error as SQLxError, postgres::PgDatabaseError};
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Postgres SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error("error parsing form data")]
    ParsingForm(Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),

    #[error("token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Crypto(#[from] crate::crypto::CryptoError),

    #[error("system clock is before unix epoch")]
    Time(#[from] std::time::SystemTimeError),

    #[error("no such record")]
    NotFound,

    #[error("an account with this email already exists")]
    DuplicateUser,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("a sauce needs a picture")]
    MissingImage,

    #[error("only the owner may modify this sauce")]
    Forbidden,

    #[error("vote already cast, clear it first")]
    Conflict,

    #[error("internal server error, {details}")]
    Internal {
        details: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("invalid 'Authorization' header")]
    Unauthorized,
}

impl ServerError {
    /// Fold a unique-violation from the store into [`ServerError::DuplicateUser`].
    ///
    /// The uniqueness constraint on the email digest is authoritative: two
    /// concurrent registrations race on the insert, not on a pre-check.
    pub fn on_duplicate(self) -> Self {
        match &self {
            ServerError::Sql(err)
                if err
                    .as_database_error()
                    .and_then(|e| e.try_downcast_ref::<PgDatabaseError>())
                    .map(|e| e.code() == UNIQUE_VIOLATION)
                    .unwrap_or(false) =>
            {
                ServerError::DuplicateUser
            },
            _ => self,
        }
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
    instance: Option<String>,
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(self) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue.to_string(),
            })
        })
        .collect()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .title("There were validation errors with your request.")
            .details(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Validation(validation_errors) => response.errors(validation_errors),

            ServerError::MissingImage => response.title("Missing sauce picture."),

            ServerError::ParsingForm(err) => response
                .title("Server error during data parsing.")
                .details(&err.to_string()),

            ServerError::NotFound => response
                .title("Record not found.")
                .status(StatusCode::NOT_FOUND),

            ServerError::DuplicateUser => response
                .title("Email already registered.")
                .status(StatusCode::CONFLICT),

            ServerError::Conflict => response
                .title("Vote already cast.")
                .status(StatusCode::CONFLICT),

            ServerError::Forbidden => response
                .title("You do not own this sauce.")
                .status(StatusCode::FORBIDDEN),

            ServerError::InvalidCredentials => response
                .title("Invalid email or password.")
                .status(StatusCode::UNAUTHORIZED),

            ServerError::Unauthorized | ServerError::Jwt(_) => response
                .title("Missing or invalid 'Authorization' header.")
                .details("Missing or invalid 'Authorization' header.")
                .status(StatusCode::UNAUTHORIZED),

            ServerError::Sql(err) => {
                tracing::error!(error = %err, "store request failed");

                ResponseError::default().details(
                    err.as_database_error()
                        .and_then(|e| e.try_downcast_ref::<PgDatabaseError>())
                        .and_then(|e| e.detail())
                        .unwrap_or("store unavailable"),
                )
            },

            ServerError::Internal { details, source } => {
                tracing::error!(source = ?source, %details, "server returned 500 status");

                ResponseError::default()
            },

            ServerError::Crypto(err) => {
                tracing::error!(error = %err, "cryptographic operation failed");

                ResponseError::default()
            },

            ServerError::Time(_) => ResponseError::default(),

            _ => response,
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "type": null,
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ServerError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(ServerError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ServerError::DuplicateUser), StatusCode::CONFLICT);
        assert_eq!(status_of(ServerError::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_of(ServerError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(ServerError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(ServerError::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(ServerError::MissingImage), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ServerError::Sql(SQLxError::PoolClosed)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_is_json() {
        let response = ServerError::Forbidden.into_response();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
