//! List every sauce.

use axum::{Json, extract::State};

use crate::AppState;
use crate::error::Result;
use crate::sauce::Sauce;

pub async fn handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Sauce>>> {
    Ok(Json(state.sauces().list().await?))
}

#[cfg(test)]
pub(super) mod tests {
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/sauces.sql"))]
    async fn test_list_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let response = make_request(
            Some((&state, "visitor")),
            app,
            Method::GET,
            "/api/sauces",
            "application/json",
            String::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let sauces: Vec<sauce::Sauce> = serde_json::from_slice(&body).unwrap();
        assert_eq!(sauces.len(), 2);
    }

    #[sqlx::test]
    async fn test_list_requires_token(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            None,
            app,
            Method::GET,
            "/api/sauces",
            "application/json",
            String::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
