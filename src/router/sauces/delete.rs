//! Remove a sauce together with its stored picture.

use axum::extract::{Path, State};
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
    Path(sauce_id): Path<String>,
    Extension(Caller(caller)): Extension<Caller>,
) -> Result<Json<Response>> {
    state.sauces().delete(&sauce_id, &caller).await?;

    tracing::info!(%sauce_id, owner = caller, "sauce removed");

    Ok(Json(Response {
        message: "Sauce deleted.".to_owned(),
    }))
}

#[cfg(test)]
pub(super) mod tests {
    use crate::router::sauces::create::tests::submit_sauce;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use sqlx::{Pool, Postgres};

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/sauces.sql"))]
    async fn test_delete_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        // The fixture's blob was never written to disk: release finds
        // nothing to unlink and the record is removed anyway.
        let response = make_request(
            Some((&state, "admin")),
            app.clone(),
            Method::DELETE,
            "/api/sauces/f00d0001",
            "application/json",
            String::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let response = make_request(
            Some((&state, "admin")),
            app,
            Method::GET,
            "/api/sauces/f00d0001",
            "application/json",
            String::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_delete_releases_picture(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let response = submit_sauce(&state, app.clone(), "admin").await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = make_request(
            Some((&state, "admin")),
            app.clone(),
            Method::GET,
            "/api/sauces",
            "application/json",
            String::default(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let sauces: Vec<sauce::Sauce> = serde_json::from_slice(&body).unwrap();
        let sauce = &sauces[0];

        let file_name = sauce.image_url.strip_prefix("/images/").unwrap();
        let on_disk = state.images.root().join(file_name);
        assert!(on_disk.exists());

        let response = make_request(
            Some((&state, "admin")),
            app,
            Method::DELETE,
            &format!("/api/sauces/{}", sauce.id),
            "application/json",
            String::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!on_disk.exists());
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/sauces.sql"))]
    async fn test_delete_foreign_sauce_forbidden(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let response = make_request(
            Some((&state, "visitor")),
            app.clone(),
            Method::DELETE,
            "/api/sauces/f00d0001",
            "application/json",
            String::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

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
    }
}
