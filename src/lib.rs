pub mod client;
pub mod config;
pub mod deploy;
pub mod error;
pub mod modules;
pub mod probe;
pub mod services;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::{any::Any, path::PathBuf, sync::Arc};
use tower::ServiceExt;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, Repositories};
use error::{error_reply, internal_error, ErrorReply};
use modules::{admin::admin_routes, data::data_routes};
use services::jwt::JwtService;
use services::mailer::OtpMailer;
use services::otp::OtpPolicy;
use services::rate_limit::{create_rate_limiter, RateLimitLayer};
use services::security::security_headers;

pub struct AppState {
    pub repositories: Repositories,
    pub mailer: Arc<dyn OtpMailer>,
    pub jwt_service: JwtService,
    pub otp_policy: OtpPolicy,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(repositories: Repositories, mailer: Arc<dyn OtpMailer>, config: &Config) -> Self {
        let session = chrono::Duration::from_std(config.jwt_ttl).unwrap_or_else(|_| chrono::Duration::hours(24));
        let static_dir = config.static_dir.is_dir().then(|| config.static_dir.clone());
        if static_dir.is_none() {
            tracing::warn!(dir = %config.static_dir.display(), "static directory not found, frontend will not be served");
        }

        Self {
            repositories,
            mailer,
            jwt_service: JwtService::new(&config.jwt_secret, session),
            otp_policy: OtpPolicy::from_config(config),
            static_dir,
        }
    }
}

/// Used when `RUST_LOG` is unset. The `deploy` and `smoke_test` binaries log under their own targets.
pub const DEFAULT_LOG_FILTER: &str = "khazaana=debug,deploy=info,smoke_test=info,tower_http=debug";

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn create_app(state: AppState, config: &Config) -> Router {
    let state = Arc::new(state);

    let rate_limiter = create_rate_limiter(config.auth_rate_limit_per_minute, config.auth_rate_limit_burst);

    let api = Router::new()
        .route("/", get(api_index))
        .route("/health", get(health_check))
        .nest("/admin", admin_routes().layer(RateLimitLayer::new(rate_limiter)))
        .nest("/data", data_routes())
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found);

    let app = Router::new().nest("/api", api).fallback(static_fallback);

    with_common_layers(app, config).with_state(state)
}

/// Security headers, body limit, panic recovery, request tracing and CORS.
pub fn with_common_layers<S>(router: Router<S>, config: &Config) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(config.environment, security_headers))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.frontend_origin))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    if origin == "*" {
        tracing::warn!("wildcard CORS origin cannot be combined with credentials, cross-origin requests disabled");
        return cors;
    }

    match HeaderValue::from_str(origin) {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(%origin, error = %e, "invalid CORS origin, cross-origin requests disabled");
            cors
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexResponse {
    success: bool,
    message: &'static str,
    available_routes: [&'static str; 3],
}

async fn api_index() -> Json<IndexResponse> {
    Json(IndexResponse {
        success: true,
        message: "Welcome to Khazaana API",
        available_routes: ["/api/health", "/api/admin", "/api/data"],
    })
}

#[derive(Serialize)]
struct HealthResponse {
    message: &'static str,
    timestamp: String,
    database: &'static str,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = if state.repositories.health.is_connected().await {
        "Connected"
    } else {
        "Disconnected"
    };

    Json(HealthResponse {
        message: "Server is running!",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        database,
    })
}

async fn route_not_found() -> ErrorReply {
    error_reply(StatusCode::NOT_FOUND, "Route not found")
}

/// Serves the built frontend for GET/HEAD, falling back to `index.html` for client-side routes.
/// Without a frontend build, `/` answers with the API welcome instead.
async fn static_fallback(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let serves_assets = matches!(*request.method(), Method::GET | Method::HEAD);

    match &state.static_dir {
        None if serves_assets && request.uri().path() == "/" => api_index().await.into_response(),
        Some(dir) if serves_assets => {
            let assets = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
            match assets.oneshot(request).await {
                Ok(response) => response.into_response(),
                Err(never) => match never {},
            }
        }
        _ => route_not_found().await.into_response(),
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "request handler panicked");

    internal_error().into_response()
}
