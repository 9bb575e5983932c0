//! Submit a new sauce (multipart: `sauce` JSON + `image` file).

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::router::sauces::Caller;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Response>)> {
    let (body, image) = super::parse_submission(multipart).await?;

    let sauce = state.sauces().create(&caller, body.into(), image).await?;

    tracing::info!(sauce_id = sauce.id, owner = caller, "sauce submitted");

    Ok((
        StatusCode::CREATED,
        Json(Response {
            message: "Sauce recorded.".to_owned(),
        }),
    ))
}
