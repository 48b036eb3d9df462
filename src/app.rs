use axum::{
    middleware,
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::VerificationKeys;
use crate::config::AppConfig;
use crate::database::{CompanyStore, UserStore};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{envelope_errors, jwt_auth_middleware};
use crate::services::{CompanyService, FileService, UserService};
use crate::storage::FileStore;

/// Shared, immutable per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub companies: CompanyService,
    pub files: FileService,
    pub keys: VerificationKeys,
    pub pool: PgPool,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn UserStore>,
        companies: Arc<dyn CompanyStore>,
        files: FileStore,
        keys: VerificationKeys,
        pool: PgPool,
    ) -> Self {
        Self {
            users: UserService::new(users, config.filter.clone()),
            companies: CompanyService::new(companies, config.filter.clone()),
            files: FileService::new(files),
            keys,
            pool,
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/health", get(public::health))
        // Protected API
        .nest("/api/v1", api_routes(state.clone()))
        .fallback(fallback)
        // Global middleware
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        // 405 and 408 are produced outside the handlers
        .layer(middleware::map_response(envelope_errors))
        .layer(TraceLayer::new_for_http());

    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    use axum::routing::post;
    use protected::{companies, storage, users};

    Router::new()
        .route("/users", post(users::create).get(users::list))
        .route(
            "/users/:id",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route("/companies", post(companies::create).get(companies::list))
        .route("/companies/:id", get(companies::get).patch(companies::update))
        .route("/storage", post(storage::upload).get(storage::list))
        .route("/storage/:id", get(storage::get).delete(storage::delete))
        .route_layer(middleware::from_fn_with_state(
            state.keys.clone(),
            jwt_auth_middleware,
        ))
}

async fn fallback() -> ApiError {
    ApiError::not_found("route not found")
}
