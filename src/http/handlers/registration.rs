use crate::domain::outcome::PROCESSING_PROBLEM;
use crate::http::response::internal_error;
use crate::http::session::{expired_session_cookie, session_token};
use crate::service::registration::{RegistrationOutcome, RegistrationRequest, RejectionReason};
use crate::AppState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(rename = "DeviceToken", default)]
    pub device_token: String,
    #[serde(rename = "MerchantID", default)]
    pub merchant_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationView {
    pub status: String,
    pub register_id: String,
    pub message: String,
}

pub async fn registration_form() -> impl IntoResponse {
    Html(REGISTRATION_PAGE)
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegistrationForm>,
) -> Response {
    let Some(token) = session_token(&headers) else {
        return no_pending_request();
    };
    let pending = match state.pending_requests.resume(&token).await {
        Ok(Some(pending)) => pending,
        Ok(None) => return no_pending_request(),
        Err(e) => {
            tracing::error!("unable to read pending request: {}", e);
            return internal_error(PROCESSING_PROBLEM);
        }
    };

    let request = RegistrationRequest {
        device_token: form.device_token,
        merchant_id: form.merchant_id,
    };
    let outcome = state.payment_service.register(&request, &pending).await;

    let (status, label, message) = match &outcome {
        RegistrationOutcome::Enrolled { outcome, .. } => {
            if let Err(e) = state.pending_requests.discard(&token).await {
                tracing::warn!("unable to discard pending request: {}", e);
            }
            (StatusCode::OK, "CREATED", outcome.customer_message.clone())
        }
        RegistrationOutcome::Rejected { reason, outcome } => {
            let status = match reason {
                RejectionReason::InvalidRequest
                | RejectionReason::DeviceTokenNotFound
                | RejectionReason::DeviceTokenAlreadyUsed => StatusCode::BAD_REQUEST,
                RejectionReason::PreviouslyRegistered => StatusCode::CONFLICT,
                RejectionReason::GatewayRejected => StatusCode::BAD_GATEWAY,
            };
            (status, "REJECTED", outcome.customer_message.clone())
        }
        RegistrationOutcome::Failed { outcome } => {
            (StatusCode::BAD_GATEWAY, "FAILED", outcome.customer_message.clone())
        }
    };

    let body = Json(RegistrationView {
        status: label.to_string(),
        register_id: pending.pos_register_id.clone(),
        message,
    });
    if matches!(outcome, RegistrationOutcome::Enrolled { .. }) {
        (status, [(SET_COOKIE, expired_session_cookie())], body).into_response()
    } else {
        (status, body).into_response()
    }
}

fn no_pending_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(RegistrationView {
            status: "REJECTED".to_string(),
            register_id: String::new(),
            message: "No pending payment found. Start the payment from the POS again".to_string(),
        }),
    )
        .into_response()
}

const REGISTRATION_PAGE: &str = r#"<!doctype html>
<html>
<head><title>Register terminal</title></head>
<body>
<form method="post" action="/register">
  <label>Merchant ID <input name="MerchantID"></label>
  <label>Device Token <input name="DeviceToken" autocomplete="off"></label>
  <button type="submit">Register</button>
</form>
</body>
</html>
"#;
