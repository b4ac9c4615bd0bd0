use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

pub mod handlers;
pub mod responses;

pub use handlers::ApiContext;

pub fn router(context: Arc<ApiContext>) -> Router {
    Router::new()
        .route("/api/zones", post(handlers::register_zone))
        .route("/api/engagement", post(handlers::record_sample))
        .route("/api/alerts", get(handlers::get_alerts))
        .route("/api/alerts/{alert_id}/resolve", post(handlers::resolve_alert))
        .route(
            "/api/interventions",
            post(handlers::send_intervention).get(handlers::get_intervention_history),
        )
        .route("/api/boosters", post(handlers::trigger_booster))
        .route("/api/quiz-responses", post(handlers::record_quiz_response))
        .route(
            "/api/sessions/{session_id}/summary",
            post(handlers::generate_summary),
        )
        .with_state(context)
}
