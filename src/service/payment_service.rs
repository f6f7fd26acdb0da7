use crate::config::PosIdentity;
use crate::domain::outcome::NormalizedOutcome;
use crate::domain::payment::PaymentRequest;
use crate::domain::terminal::Terminal;
use crate::error::{GatewayError, InvalidRequest};
use crate::gateways::response_codes::{classify, OperationType};
use crate::gateways::signature::{sign_message, verify, Signable};
use crate::gateways::{AuthorisationPayload, FinanceGateway, GatewayResponse, SalesAdjustmentPayload};
use crate::repo::terminals_repo::TerminalDirectory;
use std::sync::Arc;

/// Drives payments, refunds and terminal enrollment against the gateway.
#[derive(Clone)]
pub struct PaymentService {
    pub directory: Arc<dyn TerminalDirectory>,
    pub gateway: Arc<dyn FinanceGateway>,
    pub identity: PosIdentity,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDecision {
    /// No terminal for this (origin, register); enroll it, then replay.
    NeedsRegistration,
    Completed(PaymentResult),
}

/// Where a completed result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Classified from a verified gateway response code.
    Gateway,
    SignatureMismatch,
    Transport,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResult {
    pub outcome: NormalizedOutcome,
    pub source: ResultSource,
    pub purchase_number: Option<String>,
    /// Amount in minor units, set when approved.
    pub amount_minor: Option<i64>,
    pub pos_register_id: String,
}

impl PaymentResult {
    fn failed(request: &PaymentRequest, source: ResultSource, outcome: NormalizedOutcome) -> Self {
        Self {
            outcome,
            source,
            purchase_number: None,
            amount_minor: None,
            pos_register_id: request.pos_register_id.clone(),
        }
    }
}

impl PaymentService {
    /// Routes by sign: negative amounts are refunds.
    pub async fn process(&self, request: &PaymentRequest) -> Result<PaymentDecision, InvalidRequest> {
        if request.is_refund() {
            self.refund(request).await
        } else {
            self.authorize(request).await
        }
    }

    pub async fn authorize(&self, request: &PaymentRequest) -> Result<PaymentDecision, InvalidRequest> {
        if request.amount_minor <= 0 {
            return Err(InvalidRequest::new("amount", "payment amount must be greater than zero"));
        }

        let terminal = match self.lookup_terminal(request).await {
            Ok(Some(terminal)) => terminal,
            Ok(None) => return Ok(PaymentDecision::NeedsRegistration),
            Err(result) => return Ok(PaymentDecision::Completed(result)),
        };
        tracing::info!(
            "using gateway register {} for {}",
            terminal.masked_device_id(),
            request.pos_register_id
        );

        let amount = request.amount_minor.to_string();
        let mut payload = AuthorisationPayload {
            merchant_id: terminal.seller_id.clone(),
            device_id: terminal.gateway_device_id.clone(),
            operator_id: self.identity.operator_id.clone(),
            firmware_version: self.identity.firmware_version.clone(),
            pos_transaction_ref: transaction_ref(request),
            pre_approval_code: request.pre_approval_code.clone().unwrap_or_default(),
            finance_amount: amount.clone(),
            purchase_amount: amount,
            signature: String::new(),
        };
        payload.signature = sign_message(&payload, &terminal.signing_key);

        let response = self.gateway.authorize(&payload).await;
        Ok(PaymentDecision::Completed(self.conclude(
            request,
            &terminal,
            OperationType::Authorisation,
            response,
            request.amount_minor,
        )))
    }

    /// Refunds go to the gateway as a positive adjustment amount.
    pub async fn refund(&self, request: &PaymentRequest) -> Result<PaymentDecision, InvalidRequest> {
        let purchase_ref = request
            .purchase_number
            .clone()
            .ok_or_else(|| InvalidRequest::new("purchaseno", "a refund needs the original purchase number"))?;

        let terminal = match self.lookup_terminal(request).await {
            Ok(Some(terminal)) => terminal,
            Ok(None) => return Ok(PaymentDecision::NeedsRegistration),
            Err(result) => return Ok(PaymentDecision::Completed(result)),
        };

        let amount_minor = request
            .amount_minor
            .checked_abs()
            .ok_or_else(|| InvalidRequest::new("amount", "refund amount is out of range"))?;
        let mut payload = SalesAdjustmentPayload {
            pos_transaction_ref: transaction_ref(request),
            purchase_ref,
            merchant_id: terminal.seller_id.clone(),
            amount: amount_minor.to_string(),
            device_id: terminal.gateway_device_id.clone(),
            operator_id: self.identity.operator_id.clone(),
            firmware_version: self.identity.firmware_version.clone(),
            tracking_data: String::new(),
            signature: String::new(),
        };
        payload.signature = sign_message(&payload, &terminal.signing_key);

        let response = self.gateway.adjust_sale(&payload).await;
        Ok(PaymentDecision::Completed(self.conclude(
            request,
            &terminal,
            OperationType::SalesAdjustment,
            response,
            amount_minor,
        )))
    }

    async fn lookup_terminal(&self, request: &PaymentRequest) -> Result<Option<Terminal>, PaymentResult> {
        self.directory
            .find(&request.origin_domain, &request.pos_register_id)
            .await
            .map_err(|e| {
                tracing::error!("terminal lookup failed for {}: {}", request.origin_domain, e);
                PaymentResult::failed(request, ResultSource::Storage, NormalizedOutcome::failed(e.to_string()))
            })
    }

    /// Verify, then classify. An unverified response is never classified.
    fn conclude(
        &self,
        request: &PaymentRequest,
        terminal: &Terminal,
        operation: OperationType,
        response: Result<GatewayResponse, GatewayError>,
        amount_minor: i64,
    ) -> PaymentResult {
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("{:?} request via {} failed: {}", operation, self.gateway.name(), e);
                let outcome = match e {
                    GatewayError::Timeout(_) => NormalizedOutcome::unknown(e.to_string()),
                    _ => NormalizedOutcome::failed(e.to_string()),
                };
                return PaymentResult::failed(request, ResultSource::Transport, outcome);
            }
        };

        if !verify(&response.canonical_plaintext(), &response.signature, &terminal.signing_key) {
            tracing::warn!(
                "signature mismatch on {:?} response (code {}) for gateway register {}",
                operation,
                response.code,
                terminal.masked_device_id()
            );
            return PaymentResult::failed(
                request,
                ResultSource::SignatureMismatch,
                NormalizedOutcome::signature_mismatch(Some(response.code.clone())),
            );
        }

        let outcome = classify(operation, &response.code);
        tracing::info!("{:?} classified as {:?}: {}", operation, outcome.status, outcome.log_message);

        let approved = outcome.is_approved();
        PaymentResult {
            outcome,
            source: ResultSource::Gateway,
            purchase_number: if approved { response.purchase_number() } else { None },
            amount_minor: approved.then_some(amount_minor),
            pos_register_id: terminal.pos_register_id.clone(),
        }
    }
}

fn transaction_ref(request: &PaymentRequest) -> String {
    request
        .sale_id
        .clone()
        .unwrap_or_else(|| nanoid::nanoid!(12))
}
