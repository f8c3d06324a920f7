//! Axum server setup and routing.

use std::sync::Arc;

use axum::{
    Router,
    http::{StatusCode, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::state::AppState;

// Embed static files at compile time
const INDEX_HTML: &str = include_str!("../static/index.html");
const APP_JS: &str = include_str!("../static/app.js");
const STYLE_CSS: &str = include_str!("../static/style.css");

/// Create the Axum router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/status", get(api::health::status))
        .route("/config", get(api::health::config))
        .route(
            "/session",
            get(api::session::get_session).put(api::session::update_session),
        )
        .route("/session/reset", post(api::session::reset_session))
        .route("/circuits/validate", post(api::circuits::validate_circuit))
        .route("/run", post(api::run::run))
        .route("/results", get(api::results::get_results))
        .route("/results/csv", get(api::results::download_csv))
        // Assistant routes
        .route(
            "/chat",
            get(api::chat::history)
                .post(api::chat::ask)
                .delete(api::chat::clear),
        )
        .route("/chat/quick/{action}", post(api::chat::quick_action))
        .route("/chat/apply", post(api::chat::apply))
        .route("/backends", get(api::backends::list_backends))
        .route("/backends/{name}/status", post(api::backends::backend_status));

    let static_routes = Router::new()
        .route("/", get(serve_index))
        .route("/index.html", get(serve_index))
        .route("/app.js", get(serve_app_js))
        .route("/style.css", get(serve_style_css));

    Router::new()
        .nest("/api", api_routes)
        .merge(static_routes)
        .fallback(serve_index)
        .layer(CompressionLayer::new())
        // The panel binds to localhost by default; tighten origins before exposing it.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn serve_app_js() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        APP_JS,
    )
}

async fn serve_style_css() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css")],
        STYLE_CSS,
    )
}
