use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, SecurityConfig};
use crate::services::MediaService;
use crate::state::SharedState;

pub mod auth;
mod error;
mod ingredients;
mod observability;
mod recipes;
mod tags;
mod types;
mod users;
pub mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::RwLock;

pub struct AppState {
    pub shared: Arc<SharedState>,

    pub media: MediaService,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub const fn media(&self) -> &MediaService {
        &self.media
    }

    pub async fn page_size(&self) -> u64 {
        self.shared.config.read().await.pagination.page_size
    }

    pub async fn security_config(&self) -> SecurityConfig {
        self.shared.config.read().await.security.clone()
    }
}

pub async fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let media_path = shared.config.read().await.general.media_path.clone();

    Ok(Arc::new(AppState {
        shared,
        media: MediaService::new(media_path),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle).await
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (media_path, cors_origins) = {
        let config = state.config().read().await;
        (
            config.general.media_path.clone(),
            config.server.cors_allowed_origins.clone(),
        )
    };

    let api_router = Router::new()
        .route("/auth/token/login/", post(auth::login))
        .route("/auth/token/logout/", post(auth::logout))
        .route("/users/", get(users::list_users).post(users::register))
        .route("/users/me/", get(users::me))
        .route("/users/set_password/", post(users::set_password))
        .route("/users/subscriptions/", get(users::subscriptions))
        .route("/users/{id}/", get(users::get_user))
        .route(
            "/users/{id}/subscribe/",
            post(users::subscribe).delete(users::unsubscribe),
        )
        .route("/tags/", get(tags::list_tags))
        .route("/tags/{id}/", get(tags::get_tag))
        .route("/ingredients/", get(ingredients::list_ingredients))
        .route("/ingredients/{id}/", get(ingredients::get_ingredient))
        .route(
            "/recipes/",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipes/download_shopping_cart/",
            get(recipes::download_shopping_cart),
        )
        .route(
            "/recipes/{id}/",
            get(recipes::get_recipe)
                .patch(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/recipes/{id}/favorite/",
            post(recipes::favorite).delete(recipes::unfavorite),
        )
        .route(
            "/recipes/{id}/shopping_cart/",
            post(recipes::add_to_cart).delete(recipes::remove_from_cart),
        )
        .route("/metrics", get(observability::get_metrics))
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
        .nest_service("/media", tower_http::services::ServeDir::new(media_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
