use crate::domain::payment::PaymentRequest;
use crate::domain::outcome::PROCESSING_PROBLEM;
use crate::error::InvalidRequest;
use crate::http::response::{internal_error, invalid_request, payment_response, redirect_to_registration};
use crate::service::payment_service::PaymentDecision;
use crate::AppState;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

/// Fields the POS payment page posts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub register_id: String,
    #[serde(default)]
    pub paymentcode: Option<String>,
    #[serde(default)]
    pub sale_id: Option<String>,
    #[serde(default)]
    pub purchaseno: Option<String>,
}

impl PaymentForm {
    pub fn into_request(self) -> Result<PaymentRequest, InvalidRequest> {
        Ok(PaymentRequest::new(&self.amount, &self.origin, &self.register_id)?
            .with_sale_id(self.sale_id)
            .with_pre_approval_code(self.paymentcode)
            .with_purchase_number(self.purchaseno))
    }
}

pub async fn pay(State(state): State<AppState>, Form(form): Form<PaymentForm>) -> Response {
    let request = match form.into_request() {
        Ok(request) => request,
        Err(e) => return invalid_request(&e),
    };
    tracing::info!(
        "received {} from {} for register {}",
        request.amount_minor,
        request.origin_domain,
        request.pos_register_id
    );

    let decision = state.payment_service.process(&request).await;
    respond(&state, &request, decision).await
}

pub async fn refund(State(state): State<AppState>, Form(form): Form<PaymentForm>) -> Response {
    let request = match form.into_request() {
        Ok(request) => request,
        Err(e) => return invalid_request(&e),
    };
    tracing::info!(
        "received refund of {} from {} for register {}",
        request.amount_minor,
        request.origin_domain,
        request.pos_register_id
    );

    let decision = state.payment_service.refund(&request).await;
    respond(&state, &request, decision).await
}

/// POS landing page. Unregistered registers are sent to enrollment first.
pub async fn index(State(state): State<AppState>, Query(form): Query<PaymentForm>) -> Response {
    let request = match form.into_request() {
        Ok(request) => request,
        Err(e) => return invalid_request(&e),
    };

    match state
        .payment_service
        .directory
        .find(&request.origin_domain, &request.pos_register_id)
        .await
    {
        Ok(Some(_)) => Html(payment_page(&request)).into_response(),
        Ok(None) => suspend_for_registration(&state, &request).await,
        Err(e) => {
            tracing::error!("terminal lookup failed: {}", e);
            internal_error(PROCESSING_PROBLEM)
        }
    }
}

async fn respond(
    state: &AppState,
    request: &PaymentRequest,
    decision: Result<PaymentDecision, InvalidRequest>,
) -> Response {
    match decision {
        Ok(PaymentDecision::Completed(result)) => payment_response(&result),
        Ok(PaymentDecision::NeedsRegistration) => suspend_for_registration(state, request).await,
        Err(e) => invalid_request(&e),
    }
}

async fn suspend_for_registration(state: &AppState, request: &PaymentRequest) -> Response {
    match state.pending_requests.suspend(request).await {
        Ok(token) => {
            tracing::info!(
                "no terminal for {} / {}, redirecting to registration",
                request.origin_domain,
                request.pos_register_id
            );
            redirect_to_registration(&token, state.session_ttl_secs)
        }
        Err(e) => {
            tracing::error!("unable to hold pending request: {}", e);
            internal_error(PROCESSING_PROBLEM)
        }
    }
}

fn payment_page(request: &PaymentRequest) -> String {
    let amount = rust_decimal::Decimal::new(request.amount_minor, 2).to_string();
    format!(
        r#"<!doctype html>
<html>
<head><title>Payment</title></head>
<body>
<form id="payment" method="post" action="/pay">
  <input type="hidden" name="amount" value="{}">
  <input type="hidden" name="origin" value="{}">
  <input type="hidden" name="register_id" value="{}">
  <input type="hidden" name="sale_id" value="{}">
  <label>Payment code <input id="paymentcode" name="paymentcode" autocomplete="off"></label>
  <button type="submit">Pay</button>
</form>
<div id="statusMessage"></div>
</body>
</html>
"#,
        escape_attr(&amount),
        escape_attr(&request.origin_domain),
        escape_attr(&request.pos_register_id),
        escape_attr(request.sale_id.as_deref().unwrap_or_default()),
    )
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_page_carries_request_fields() {
        let request = PaymentRequest::new("44.00", "http://pos.example.com", "R\"1")
            .unwrap()
            .with_sale_id(Some("sale-9".to_string()));
        let page = payment_page(&request);
        assert!(page.contains(r#"name="amount" value="44.00""#));
        assert!(page.contains(r#"value="R&quot;1""#));
        assert!(page.contains(r#"name="sale_id" value="sale-9""#));
    }
}
