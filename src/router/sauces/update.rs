//! Edit a sauce: plain JSON, or multipart when the picture changes too.

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::router::sauces::Caller;
use crate::{AppState, ServerError};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub message: String,
}

pub async fn handler(
    State(state): State<AppState>,
    Path(sauce_id): Path<String>,
    Extension(Caller(caller)): Extension<Caller>,
    req: Request,
) -> Result<Json<Response>> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let (body, image) = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &())
            .await
            .map_err(|err| ServerError::ParsingForm(Box::new(err)))?;
        super::parse_submission(multipart).await?
    } else {
        let Json(body) = Json::<super::Body>::from_request(req, &()).await?;
        body.validate()?;
        (body, None)
    };

    state
        .sauces()
        .update(&sauce_id, &caller, body.into(), image)
        .await?;

    Ok(Json(Response {
        message: "Sauce updated.".to_owned(),
    }))
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::router::sauces::tests::{MULTIPART_BOUNDARY, multipart_body};
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    async fn fetch(
        state: &AppState,
        app: axum::Router,
        id: &str,
    ) -> sauce::Sauce {
        let response = make_request(
            Some((state, "visitor")),
            app,
            Method::GET,
            &format!("/api/sauces/{id}"),
            "application/json",
            String::default(),
        )
        .await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn hotter_sriracha() -> serde_json::Value {
        json!({
            "name": "Sriracha XO",
            "manufacturer": "Huy Fong",
            "description": "Same rooster, more fire.",
            "mainPepper": "Red jalapeno",
            "heat": 9,
        })
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/sauces.sql"))]
    async fn test_update_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let response = make_request(
            Some((&state, "admin")),
            app.clone(),
            Method::PUT,
            "/api/sauces/f00d0001",
            "application/json",
            hotter_sriracha().to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let sauce = fetch(&state, app, "f00d0001").await;
        assert_eq!(sauce.name, "Sriracha XO");
        assert_eq!(sauce.heat, 9);
        // No picture supplied, the stored one stays.
        assert_eq!(sauce.image_url, "/images/fixture.png");
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/sauces.sql"))]
    async fn test_update_replaces_picture(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let response = make_request(
            Some((&state, "admin")),
            app.clone(),
            Method::PUT,
            "/api/sauces/f00d0001",
            &format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            multipart_body(&hotter_sriracha(), Some(b"IMG2")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let sauce = fetch(&state, app, "f00d0001").await;
        assert_ne!(sauce.image_url, "/images/fixture.png");

        let file_name = sauce.image_url.strip_prefix("/images/").unwrap();
        let on_disk = state.images.root().join(file_name);
        assert_eq!(std::fs::read(on_disk).unwrap(), b"IMG2");
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql", "../../../fixtures/sauces.sql"))]
    async fn test_update_foreign_sauce_forbidden(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());

        let response = make_request(
            Some((&state, "visitor")),
            app.clone(),
            Method::PUT,
            "/api/sauces/f00d0001",
            "application/json",
            hotter_sriracha().to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // Record untouched.
        let sauce = fetch(&state, app, "f00d0001").await;
        assert_eq!(sauce.name, "Sriracha");
        assert_eq!(sauce.heat, 6);
    }
}
