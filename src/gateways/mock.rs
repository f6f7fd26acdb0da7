use crate::error::GatewayError;
use crate::gateways::response_codes::{
    AUTHORISATION_APPROVED, REGISTRATION_APPROVED, SALES_ADJUSTMENT_APPROVED,
};
use crate::gateways::signature::{sign_message, verify, Signable};
use crate::gateways::{
    AuthorisationPayload, FinanceGateway, GatewayResponse, RegistrationPayload, SalesAdjustmentPayload,
};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    Unreachable,
    Timeout,
    InvalidResponse,
    /// Answer normally but with a signature that will not verify.
    TamperedSignature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Register(RegistrationPayload),
    Authorize(AuthorisationPayload),
    AdjustSale(SalesAdjustmentPayload),
}

/// In-process stand-in for the finance gateway.
///
/// Checks request signatures the way the gateway does (ESIG01 on
/// mismatch), issues `issued_key` on CreateKey and signs its own replies
/// with that key.
pub struct MockGateway {
    pub issued_key: String,
    pub registration_code: String,
    pub authorisation_code: String,
    pub adjustment_code: String,
    pub fault: Option<MockFault>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    pub fn new(issued_key: &str) -> Self {
        Self {
            issued_key: issued_key.to_string(),
            registration_code: REGISTRATION_APPROVED.to_string(),
            authorisation_code: AUTHORISATION_APPROVED.to_string(),
            adjustment_code: SALES_ADJUSTMENT_APPROVED.to_string(),
            fault: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_registration_code(mut self, code: &str) -> Self {
        self.registration_code = code.to_string();
        self
    }

    pub fn with_authorisation_code(mut self, code: &str) -> Self {
        self.authorisation_code = code.to_string();
        self
    }

    pub fn with_adjustment_code(mut self, code: &str) -> Self {
        self.adjustment_code = code.to_string();
        self
    }

    pub fn with_fault(mut self, fault: MockFault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: RecordedCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn transport_fault(&self) -> Result<(), GatewayError> {
        match self.fault {
            Some(MockFault::Unreachable) => Err(GatewayError::Unreachable("mock gateway offline".to_string())),
            Some(MockFault::Timeout) => Err(GatewayError::Timeout(0)),
            Some(MockFault::InvalidResponse) => {
                Err(GatewayError::InvalidResponse("mock gateway returned html".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn respond(&self, request: &dyn Signable, request_signature: &str, request_key: &str, code: &str) -> GatewayResponse {
        let code = if verify(&request.canonical_plaintext(), request_signature, request_key) {
            code
        } else {
            "ESIG01"
        };

        let mut response = GatewayResponse {
            status: if code.starts_with('S') { "Success" } else { "Failed" }.to_string(),
            code: code.to_string(),
            message: code.to_string(),
            ..Default::default()
        };
        if code == AUTHORISATION_APPROVED || code == SALES_ADJUSTMENT_APPROVED {
            response.purchase_number = format!("mock_{}", uuid::Uuid::new_v4().simple());
        }
        if code == REGISTRATION_APPROVED {
            response.key = self.issued_key.clone();
        }

        response.signature = sign_message(&response, &self.issued_key);
        if self.fault == Some(MockFault::TamperedSignature) {
            response.signature = sign_message(&response, "not-the-issued-key");
        }
        response
    }
}

#[async_trait::async_trait]
impl FinanceGateway for MockGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn register(&self, payload: &RegistrationPayload) -> Result<GatewayResponse, GatewayError> {
        self.record(RecordedCall::Register(payload.clone()));
        self.transport_fault()?;
        Ok(self.respond(payload, &payload.signature, &payload.device_token, &self.registration_code))
    }

    async fn authorize(&self, payload: &AuthorisationPayload) -> Result<GatewayResponse, GatewayError> {
        self.record(RecordedCall::Authorize(payload.clone()));
        self.transport_fault()?;
        Ok(self.respond(payload, &payload.signature, &self.issued_key, &self.authorisation_code))
    }

    async fn adjust_sale(&self, payload: &SalesAdjustmentPayload) -> Result<GatewayResponse, GatewayError> {
        self.record(RecordedCall::AdjustSale(payload.clone()));
        self.transport_fault()?;
        Ok(self.respond(payload, &payload.signature, &self.issued_key, &self.adjustment_code))
    }
}
