//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One pitch endpoint plus two diagnostics endpoints and a health check.
//! CORS is open to any origin; the browser form is served from elsewhere.
//! The pitch route only advertises POST and OPTIONS.

pub mod diagnostics;
pub mod pitch;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode};
use axum::routing::{any, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let pitch_routes = Router::new()
        .route(
            "/api/generate-info",
            post(pitch::generate_info)
                .options(pitch::preflight)
                .fallback(pitch::method_not_allowed),
        )
        .layer(cors(&[Method::POST, Method::OPTIONS]));

    let diagnostics_routes = Router::new()
        .route("/api/test", any(diagnostics::api_test))
        .route("/api/debug-apis", get(diagnostics::debug_apis).post(diagnostics::debug_apis))
        .route("/healthz", get(healthz))
        .layer(cors(&[Method::GET, Method::POST, Method::OPTIONS]));

    Router::new()
        .merge(pitch_routes)
        .merge(diagnostics_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors(methods: &[Method]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(methods.to_vec())
        .allow_headers([CONTENT_TYPE])
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
