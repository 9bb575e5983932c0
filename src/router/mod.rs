//! HTTP surface: one module per operation.

pub mod login;
pub mod sauces;
pub mod signup;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::ServerError;

/// JSON extractor that runs the body through its validation rules.
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ServerError;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// MUST NEVER be used in production.
#[cfg(test)]
pub fn state(pool: sqlx::PgPool) -> crate::AppState {
    use std::sync::Arc;

    let crypto = Arc::new(
        crate::crypto::Crypto::new(
            Some(crate::config::Argon2 {
                memory_cost: 1024,
                iterations: 2,
                parallelism: 1,
                hash_length: 32,
            }),
            "test master key",
            "test pepper",
        )
        .expect("cannot build crypto"),
    );
    let images = crate::image::ImageStore::new(
        std::env::temp_dir().join("saucery-test-images"),
    )
    .expect("cannot create image directory");

    crate::AppState {
        config: Arc::new(crate::config::Configuration::default()),
        db: crate::database::Database { postgres: pool },
        crypto,
        token: crate::token::TokenManager::new("saucery-tests", "test-secret"),
        images,
    }
}
