use crate::domain::outcome::OutcomeStatus;
use crate::error::InvalidRequest;
use crate::http::session::session_cookie;
use crate::service::payment_service::{PaymentResult, ResultSource};
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// JSON the POS payment page acts on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserResponse {
    pub id: String,
    pub amount: String,
    pub register_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl BrowserResponse {
    pub fn from_result(result: &PaymentResult) -> Self {
        Self {
            id: result.purchase_number.clone().unwrap_or_default(),
            amount: result.amount_minor.map(|a| a.to_string()).unwrap_or_default(),
            register_id: result.pos_register_id.clone(),
            status: result.outcome.status.pos_status().to_string(),
            message: result.outcome.customer_message.clone(),
        }
    }
}

pub fn payment_response(result: &PaymentResult) -> Response {
    let status = match result.source {
        ResultSource::Gateway | ResultSource::SignatureMismatch => StatusCode::OK,
        ResultSource::Transport => StatusCode::BAD_GATEWAY,
        ResultSource::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(BrowserResponse::from_result(result))).into_response()
}

pub fn invalid_request(e: &InvalidRequest) -> Response {
    tracing::info!("rejecting request: {}", e);
    (
        StatusCode::BAD_REQUEST,
        Json(BrowserResponse {
            status: OutcomeStatus::Failed.pos_status().to_string(),
            message: e.to_string(),
            ..Default::default()
        }),
    )
        .into_response()
}

/// Sends the browser to enrollment, carrying the pending-request token.
pub fn redirect_to_registration(token: &str, max_age_secs: u64) -> Response {
    (
        StatusCode::FOUND,
        [
            (LOCATION, "/register".to_string()),
            (SET_COOKIE, session_cookie(token, max_age_secs)),
        ],
    )
        .into_response()
}

pub fn internal_error(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(BrowserResponse {
            status: OutcomeStatus::Failed.pos_status().to_string(),
            message: message.to_string(),
            ..Default::default()
        }),
    )
        .into_response()
}
