//! Sauces-related HTTP API. Every route requires a bearer token.
mod create;
mod delete;
mod get;
mod like;
mod list;
mod update;

use axum::extract::{DefaultBodyLimit, Multipart, Request, State};
use axum::http::header;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Router, middleware};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::sauce::{SauceFields, Upload};
use crate::{AppState, ServerError};

const BEARER: &str = "Bearer ";
const BODY_LIMIT: usize = 8 * 1024 * 1024; // pictures included.

/// Authenticated caller, extracted from the bearer token by [`auth`].
#[derive(Clone, Debug)]
pub struct Caller(pub String);

/// Custom middleware for authentification.
async fn auth(
    State(state): State<AppState>,
    mut req: Request,
    next: middleware::Next,
) -> std::result::Result<Response, ServerError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ServerError::Unauthorized)?;
    let token = token.replace(BEARER, "");

    let claims = state
        .token
        .decode(&token)
        .map_err(|_| ServerError::Unauthorized)?;

    req.extensions_mut().insert(Caller(claims.sub));
    Ok(next.run(req).await)
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // `GET /` lists every sauce, `POST /` submits one (multipart).
        .route("/", get(list::handler).post(create::handler))
        // One sauce: read, edit, remove.
        .route(
            "/{sauce_id}",
            get(get::handler).put(update::handler).delete(delete::handler),
        )
        // `POST /{sauce_id}/like` casts, flips or clears a vote.
        .route("/{sauce_id}/like", post(like::handler))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .route_layer(middleware::from_fn_with_state(state, auth))
}

/// Sauce fields as sent by clients, both on submission and edit.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be 1 to 100 characters long."
    ))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Manufacturer must be 1 to 100 characters long."
    ))]
    pub manufacturer: String,
    #[validate(length(
        min = 1,
        max = 500,
        message = "Description must be 1 to 500 characters long."
    ))]
    pub description: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Main pepper must be 1 to 100 characters long."
    ))]
    pub main_pepper: String,
    #[validate(range(min = 1, max = 10, message = "Heat must be 1 to 10."))]
    pub heat: i16,
}

impl From<Body> for SauceFields {
    fn from(body: Body) -> SauceFields {
        SauceFields {
            name: body.name,
            manufacturer: body.manufacturer,
            description: body.description,
            main_pepper: body.main_pepper,
            heat: body.heat,
        }
    }
}

/// Pull the `sauce` JSON part and the optional `image` part out of a
/// multipart submission, then run field validation.
pub(super) async fn parse_submission(
    mut multipart: Multipart,
) -> Result<(Body, Option<Upload>)> {
    let mut body = None;
    let mut image = None;

    while let Some(field) =
        multipart.next_field().await.map_err(parsing_error)?
    {
        // `text`/`bytes` consume the field, so the name cannot stay borrowed.
        let name = field.name().map(ToOwned::to_owned);
        match name.as_deref() {
            Some("sauce") => {
                let raw = field.text().await.map_err(parsing_error)?;
                body = Some(
                    serde_json::from_str::<Body>(&raw)
                        .map_err(|err| ServerError::ParsingForm(Box::new(err)))?,
                );
            },
            Some("image") => {
                let content_type =
                    field.content_type().map(ToOwned::to_owned);
                let bytes = field.bytes().await.map_err(parsing_error)?;
                image = Some((bytes, content_type));
            },
            _ => continue,
        }
    }

    let body = body.ok_or_else(missing_sauce_part)?;
    body.validate()?;

    Ok((body, image))
}

fn parsing_error(err: axum::extract::multipart::MultipartError) -> ServerError {
    ServerError::ParsingForm(Box::new(err))
}

fn missing_sauce_part() -> ServerError {
    let mut errors = validator::ValidationErrors::new();
    errors.add(
        "sauce",
        validator::ValidationError::new("missing")
            .with_message("Missing 'sauce' field.".into()),
    );
    errors.into()
}
