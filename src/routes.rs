use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{handlers::meals, middleware_layer::session::require_session, state::AppState};

/// Builds the HTTP router for the meal API.
///
/// Creation is open and mints a session when needed; every other route sits
/// behind `require_session`.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    let create_routes = Router::new()
        .route("/", post(meals::create_meal))
        .with_state(state.clone());

    let session_routes = Router::new()
        .route("/", get(meals::list_meals))
        .route("/summary", get(meals::summary))
        .route(
            "/{id}",
            get(meals::get_meal)
                .put(meals::update_meal)
                .delete(meals::delete_meal),
        )
        .route_layer(from_fn(require_session))
        .with_state(state.clone());

    Router::new()
        .merge(create_routes)
        .merge(session_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(cors)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400));

    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!("⚠️ Invalid CORS_ORIGIN {:?}: {}, cross-origin requests disabled", origin, e);
            cors
        }
    }
}
