use axum::{
    http::Method,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod calendar;
pub mod clients;
pub mod error;
pub mod events;
pub mod reservations;
pub mod state;
pub mod templates;
pub mod vacations;

pub use error::AppError;
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT]);

    Router::new()
        .nest("/v1", routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Templates
        .route("/templates", post(templates::create_template).get(templates::list_templates))
        .route("/templates/{id}", get(templates::get_template).put(templates::update_template))
        .route("/templates/{id}/activate", post(templates::activate_template))
        .route("/templates/{id}/archive", post(templates::archive_template))
        .route("/templates/{id}/month-base", post(templates::set_month_base))
        .route("/templates/{id}/preview", get(templates::preview))
        .route("/templates/{id}/preview/month", get(templates::preview_month))
        .route("/templates/{id}/apply", post(templates::apply))
        // Calendar
        .route("/calendar/weeks", get(calendar::month_weeks))
        .route(
            "/reservations",
            post(reservations::create_reservation).get(reservations::list_reservations),
        )
        .route("/reservations/{id}/status", post(reservations::update_status))
        // Vacations
        .route("/vacations", post(vacations::create_vacation).get(vacations::list_vacations))
        .route("/vacations/calculate", get(vacations::calculate))
        .route("/vacations/{id}", get(vacations::get_vacation))
        .route("/vacations/{id}/approve", post(vacations::approve_vacation))
        .route("/vacations/{id}/reject", post(vacations::reject_vacation))
        .route("/vacations/{id}/cancel", post(vacations::cancel_vacation))
        .route("/trainers/{id}/vacation-balance", get(vacations::trainer_balance))
        // Clients
        .route("/clients/{id}/quota", get(clients::get_quota).put(clients::set_quota_adjustment))
        .route("/clients/{id}/subscription", axum::routing::put(clients::set_subscription))
        .route("/events/stream", get(events::stream))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
