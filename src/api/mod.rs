mod handlers;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::db::Database;

pub use handlers::ListQuery;

/// Build the router with permissive CORS.
pub fn create_router(db: Database) -> Router {
    create_router_with_config(db, &AppConfig::default())
}

pub fn create_router_with_config(db: Database, config: &AppConfig) -> Router {
    let api = Router::new()
        // Dashboard
        .route("/dashboard/cards", get(handlers::get_card_data))
        .route("/dashboard/latest-applications", get(handlers::list_latest_applications))
        // Applications
        .route("/applications", get(handlers::list_applications))
        .route("/applications", post(handlers::create_application))
        .route("/applications/{id}", get(handlers::get_application))
        .route("/applications/{id}", put(handlers::update_application))
        .route("/applications/{id}", delete(handlers::delete_application))
        // Masters
        .route("/masters", get(handlers::list_masters))
        .route("/masters", post(handlers::create_master))
        .route("/masters/options", get(handlers::list_master_options))
        .route("/masters/{id}", get(handlers::get_master))
        .route("/masters/{id}", put(handlers::update_master))
        .route("/masters/{id}", delete(handlers::delete_master))
        .route("/masters/{id}/workload", get(handlers::get_master_workload))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(db)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", o);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
        None => CorsLayer::permissive(),
    }
}
