//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod cards;
mod students;

use crate::config::Settings;
use crate::state::SharedState;
use axum::{
    http::{header, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    // Build the router
    Router::new()
        // Liveness + discovery
        .route("/hello", get(hello))
        .route("/endpoints", get(endpoints))
        // Card routes
        .route("/createCard", post(cards::create_card))
        .route("/getAllCards", get(cards::get_all_cards))
        .route("/getCard/{id}", get(cards::get_card))
        .route("/updateCard/{id}", patch(cards::update_card))
        .route("/updateCardFull/{id}", put(cards::update_card_full))
        .route("/deleteCard/{id}", delete(cards::delete_card))
        // Student CSV sidecar. The source registered one spelling and
        // advertised another in its catalog; serve both.
        .route("/getstudents5CSV", get(students::get_students_csv))
        .route("/gettudents5CSV", get(students::get_students_csv))
        .route("/createstudents5CSV", post(students::create_student_csv))
        // Apply middleware and state
        .layer(middleware)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let methods: Vec<Method> = settings
        .cors
        .allowed_methods
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600));

    // An empty allow-list means wide open (some source variants ran without
    // any CORS restriction)
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// Plain-text liveness probe
async fn hello() -> &'static str {
    "API activa y funcionando correctamente"
}

/// Static route catalog
async fn endpoints() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Available API Endpoints",
        "endpoints": [
            { "method": "POST",   "path": "/createCard" },
            { "method": "GET",    "path": "/getAllCards" },
            { "method": "GET",    "path": "/getCard/:id" },
            { "method": "PATCH",  "path": "/updateCard/:id" },
            { "method": "PUT",    "path": "/updateCardFull/:id" },
            { "method": "DELETE", "path": "/deleteCard/:id" },
            { "method": "GET",    "path": "/hello" },
            { "method": "GET",    "path": "/getstudents5CSV", "description": "Obtener todos los alumnos desde CSV" },
            { "method": "POST",   "path": "/createstudents5CSV", "description": "Agregar un nuevo alumno al CSV" }
        ]
    }))
}
