//! Cast, flip or clear a vote on a sauce.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::router::Valid;
use crate::router::sauces::Caller;
use crate::sauce::Vote;
use crate::{AppState, ServerError};

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub user_id: String,
    pub like: Vote,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Path(sauce_id): Path<String>,
    Extension(Caller(caller)): Extension<Caller>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    // Votes count against the token bearer; the body may not speak for
    // someone else.
    if body.user_id != caller {
        return Err(ServerError::Forbidden);
    }

    state.sauces().vote(&sauce_id, &caller, body.like).await?;

    let message = match body.like {
        Vote::Like => "Like recorded.",
        Vote::Dislike => "Dislike recorded.",
        Vote::Clear => "Vote cleared.",
    };

    Ok(Json(Response {
        message: message.to_owned(),
    }))
}
