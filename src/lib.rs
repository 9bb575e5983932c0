//! Saucery is a small REST backend to review and rate hot sauces.

#[forbid(unsafe_code)]
#[deny(missing_docs, unused_mut)]
mod crypto;
mod database;
pub mod error;
mod image;
mod router;
mod sauce;
mod token;
mod user;

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, header};
use axum::routing::post;
use axum::Router;
use error::ServerError;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

use crate::sauce::SauceService;
use crate::user::AuthService;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    auth: Option<(&AppState, &str)>,
    app: Router,
    method: Method,
    path: &str,
    content_type: &str,
    body: impl Into<axum::body::Body>,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let token = match auth {
        Some((state, user_id)) => format!(
            "Bearer {}",
            state.token.create(user_id).expect("cannot create JWT")
        ),
        None => String::default(),
    };

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::AUTHORIZATION, token)
            .body(body.into())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub crypto: Arc<crypto::Crypto>,
    pub token: token::TokenManager,
    pub images: image::ImageStore,
}

impl AppState {
    /// Account manager bound to this state.
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.db.postgres.clone(), Arc::clone(&self.crypto))
    }

    /// Sauce manager bound to this state.
    pub fn sauces(&self) -> SauceService {
        SauceService::new(self.db.postgres.clone(), self.images.clone())
    }
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    let images_root = state.images.root().to_path_buf();

    Router::new()
        // `POST /api/auth/signup` registers an account.
        .route("/api/auth/signup", post(router::signup::handler))
        // `POST /api/auth/login` trades credentials for a bearer token.
        .route("/api/auth/login", post(router::login::handler))
        // Sauce CRUD and votes. Authorization required.
        .nest("/api/sauces", router::sauces::router(state.clone()))
        .with_state(state)
        // Uploaded pictures, served as plain files.
        .nest_service(image::PUBLIC_ROUTE, ServeDir::new(images_root))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>>
{
    // read configuration file. let it in memory.
    let config = config::Configuration::default().read()?;

    let db = match config.postgres {
        Some(ref config) => {
            database::Database::new(
                &config.address,
                &config
                    .username
                    .clone()
                    .unwrap_or(database::DEFAULT_CREDENTIALS.into()),
                &config
                    .password
                    .clone()
                    .unwrap_or(database::DEFAULT_CREDENTIALS.into()),
                &config
                    .database
                    .clone()
                    .unwrap_or(database::DEFAULT_DATABASE_NAME.into()),
                config.pool_size.unwrap_or(database::DEFAULT_POOL_SIZE),
            )
            .await?
        },
        None => {
            tracing::error!("missing `postgres` entry on `config.yaml` file");
            std::process::exit(0);
        },
    };

    let key =
        std::env::var("KEY").expect("missing `KEY` environnement variable");
    let salt =
        std::env::var("SALT").expect("missing `SALT` environnement variable");
    let crypto =
        Arc::new(crypto::Crypto::new(config.argon2.clone(), key, salt)?);

    // handle jwt.
    let Some(token) = &config.token else {
        tracing::warn!("missing `token` entry on `config.yaml` file");
        std::process::exit(0);
    };
    let token = token::TokenManager::new(&config.url, &token.secret);

    // picture storage, served under `/images`.
    let images = image::ImageStore::new(
        config.images.clone().unwrap_or_default().path.as_str(),
    )?;

    Ok(AppState {
        config,
        db,
        crypto,
        token,
        images,
    })
}
