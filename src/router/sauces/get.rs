//! Read one sauce.

use axum::extract::{Path, State};
use axum::Json;

use crate::AppState;
use crate::error::Result;
use crate::sauce::Sauce;

pub async fn handler(
    State(state): State<AppState>,
    Path(sauce_id): Path<String>,
) -> Result<Json<Sauce>> {
    Ok(Json(state.sauces().get(&sauce_id).await?))
}

#[cfg(test)]
pub(super) mod tests {
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/sauces.sql"))]
    async fn test_get_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let response = make_request(
            Some((&state, "visitor")),
            app,
            Method::GET,
            "/api/sauces/f00d0001",
            "application/json",
            String::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let sauce: sauce::Sauce = serde_json::from_slice(&body).unwrap();
        assert_eq!(sauce.name, "Sriracha");
        assert_eq!(sauce.user_id, "admin");
        assert_eq!(sauce.likes, 0);
        assert!(sauce.users_liked.is_empty());
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_get_unknown_sauce(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let response = make_request(
            Some((&state, "visitor")),
            app,
            Method::GET,
            "/api/sauces/missing",
            "application/json",
            String::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
