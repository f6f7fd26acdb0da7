use crate::http::handlers::{ops, payments, registration};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(ops::health))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .route("/", get(payments::index))
        .route("/pay", post(payments::pay))
        .route("/refund", post(payments::refund))
        .route(
            "/register",
            get(registration::registration_form).post(registration::register),
        )
        .with_state(state)
}
