//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//! Layers: CORS (outermost) → `Cache-Control: no-store` → handler.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// `cors_origins` lists the browser origins allowed to call the API; an
/// empty list allows any origin.
pub fn api_router(core: Arc<CoreState>, cors_origins: &[String]) -> Router {
    build_router(ApiContext::new(core), cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

fn build_router(ctx: ApiContext, cors: CorsLayer) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::get)
                .put(endpoints::patients::replace)
                .delete(endpoints::patients::delete),
        )
        .route(
            "/patients/:id/timeline",
            get(endpoints::timeline::list).post(endpoints::timeline::append),
        )
        .route(
            "/patients/:id/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::prepend),
        )
        .route(
            "/patients/:id/appointments/publish",
            post(endpoints::appointments::publish),
        )
        .route(
            "/patients/:id/medications/recommended",
            post(endpoints::medications::adopt),
        )
        .route("/ai-diagnosis", post(endpoints::diagnosis::diagnose))
        .route("/test-medications", post(endpoints::diagnosis::sample))
        .route("/chat", post(endpoints::chat::send))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors)
}
