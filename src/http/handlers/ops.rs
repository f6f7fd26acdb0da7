use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let directory_ok = match state.payment_service.directory.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("terminal directory not ready: {}", e);
            false
        }
    };
    let sessions_ok = match state.pending_requests.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("pending request store not ready: {}", e);
            false
        }
    };

    let ok = directory_ok && sessions_ok;
    let status = if ok {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "ready": ok,
            "terminal_directory": directory_ok,
            "pending_requests": sessions_ok,
            "gateway": state.payment_service.gateway.name()
        })),
    )
        .into_response()
}

pub async fn liveness() -> impl IntoResponse {
    (axum::http::StatusCode::OK, Json(serde_json::json!({"alive": true}))).into_response()
}
