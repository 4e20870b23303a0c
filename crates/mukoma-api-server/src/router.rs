use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.settings.server.body_limit_bytes;

    // Public liveness routes
    let public_routes = Router::new()
        .route("/", get(handlers::health::liveness))
        .route("/health", get(handlers::health::health_check));

    // Chat + memory debug routes
    let api_routes = Router::new()
        .route("/mukoma-ai", post(handlers::chat::chat_handler))
        .route(
            "/memory/{user_id}",
            get(handlers::memory::get_memory_handler)
                .delete(handlers::memory::clear_memory_handler),
        );

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        // CORS
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(DefaultBodyLimit::max(body_limit))
}
