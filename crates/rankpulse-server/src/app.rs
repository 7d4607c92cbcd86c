use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Raw body cap. A full sync batch is well under this; oversize row counts
/// are rejected by the handler with a JSON error instead.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware, outermost first:
///
/// 1. `CorsLayer`: any origin unless `RANKPULSE_CORS_ORIGINS` lists some.
/// 2. `TraceLayer`: request/response logging via `tracing`.
/// 3. `CompressionLayer`: gzip for keyword tables and dashboards.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/classify", post(routes::classify::classify))
        .route(
            "/api/brand-variations",
            post(routes::classify::brand_variations),
        )
        .route(
            "/api/sites",
            post(routes::sites::create_site).get(routes::sites::list_sites),
        )
        .route(
            "/api/sites/{site_id}",
            get(routes::sites::get_site).delete(routes::sites::delete_site),
        )
        .route("/api/sites/{site_id}/sync", post(routes::sync::sync))
        .route(
            "/api/sites/{site_id}/keywords",
            get(routes::keywords::list_keywords).post(routes::keywords::add_keyword),
        )
        .route(
            "/api/sites/{site_id}/keywords/{keyword_id}",
            get(routes::keywords::get_keyword)
                .patch(routes::keywords::update_keyword)
                .delete(routes::keywords::remove_keyword),
        )
        .route(
            "/api/sites/{site_id}/dashboard",
            get(routes::dashboard::dashboard),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}
