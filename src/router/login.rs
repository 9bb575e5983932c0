use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Result, ServerError};
use crate::router::Valid;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    pub password: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub user_id: String,
    pub token: String,
}

/// Handler to log into an account.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let user = match state.auth().authenticate(&body.email, &body.password).await
    {
        Ok(user) => user,
        // An unknown address reads the same as a wrong password from the
        // outside.
        Err(ServerError::NotFound) => {
            tracing::debug!("login attempt on unknown address");
            return Err(ServerError::InvalidCredentials);
        },
        Err(err) => return Err(err),
    };

    let token = state.token.create(&user.id)?;

    Ok(Json(Response {
        user_id: user.id,
        token,
    }))
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    const EMAIL: &str = "chef@piquante.example";
    const PASSWORD: &str = "StRong_PaSsW0rD";

    async fn signup(app: axum::Router) {
        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/auth/signup",
            "application/json",
            json!({ "email": EMAIL, "password": PASSWORD }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[sqlx::test]
    async fn test_login_handler(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state.clone());
        signup(app.clone()).await;

        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/auth/login",
            "application/json",
            json!({ "email": EMAIL, "password": PASSWORD }).to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert!(!body.user_id.is_empty());

        // Token payload carries the user id and a 24-hour window.
        let claims = state.token.decode(&body.token).unwrap();
        assert_eq!(claims.sub, body.user_id);
        assert_eq!(claims.exp - claims.iat, crate::token::EXPIRATION_TIME);
    }

    #[sqlx::test]
    async fn test_login_wrong_password(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);
        signup(app.clone()).await;

        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/auth/login",
            "application/json",
            json!({ "email": EMAIL, "password": "wrong_password_1" })
                .to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_login_unknown_account(pool: Pool<Postgres>) {
        let state = router::state(pool);
        let app = app(state);

        let response = make_request(
            None,
            app,
            Method::POST,
            "/api/auth/login",
            "application/json",
            json!({ "email": EMAIL, "password": PASSWORD }).to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
