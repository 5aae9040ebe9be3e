use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::db::Store;
use crate::domain::Role;
use crate::models::User;
use crate::services::{ApprovalService, DirectoryService, ReportService, RequestService};

pub mod auth;
mod categories;
mod error;
mod observability;
mod reports;
mod requests;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub directory: DirectoryService,

    pub requests: RequestService,

    pub approvals: ApprovalService,

    pub reports: ReportService,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    Ok(Arc::new(AppState {
        directory: DirectoryService::new(store.clone()),
        requests: RequestService::new(store.clone()),
        approvals: ApprovalService::new(store.clone()),
        reports: ReportService::new(store.clone()),
        store,
        config,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

/// Admin-only gate for directory management and full listings.
pub(crate) fn require_admin(user: &User) -> Result<(), ApiError> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Employee | Role::Approver1 | Role::Approver2 => Err(ApiError::Forbidden(
            "administrator access required".to_string(),
        )),
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();
    let session_minutes = state.config.server.session_minutes;

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.config.server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/categories", get(categories::list))
        .route("/requests", post(requests::submit))
        .route("/requests", get(requests::list_all))
        .route("/requests/mine", get(requests::list_mine))
        .route("/requests/pending", get(requests::list_pending))
        .route("/requests/{id}/decision", post(requests::decide))
        .route("/requests/{id}", put(requests::update))
        .route("/requests/{id}", delete(requests::delete))
        .route("/reports", get(reports::user_summaries))
        .route("/reports/statistics", get(reports::statistics))
        .route("/users", get(users::list))
        .route("/users", post(users::create))
        .route("/users/approvers", get(users::list_approvers))
        .route("/users/{nik}/role", put(users::update_role))
        .route("/users/{nik}", delete(users::delete))
        .route("/profile", put(users::update_profile))
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
