use crate::domain::outcome::{NormalizedOutcome, OutcomeStatus};
use crate::domain::payment::PaymentRequest;
use crate::domain::terminal::{mask_secret, Terminal};
use crate::error::DirectoryError;
use crate::gateways::response_codes::{
    classify, OperationType, DEVICE_TOKEN_ALREADY_USED, DEVICE_TOKEN_NOT_FOUND,
};
use crate::gateways::signature::sign_message;
use crate::gateways::RegistrationPayload;
use crate::service::payment_service::PaymentService;

/// Enrollment details typed in by the operator.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub device_token: String,
    pub merchant_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    InvalidRequest,
    DeviceTokenNotFound,
    DeviceTokenAlreadyUsed,
    PreviouslyRegistered,
    GatewayRejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Terminal stored; the held payment can be replayed.
    Enrolled {
        terminal: Terminal,
        outcome: NormalizedOutcome,
    },
    Rejected {
        reason: RejectionReason,
        outcome: NormalizedOutcome,
    },
    /// Transport or storage failure.
    Failed { outcome: NormalizedOutcome },
}

pub const PREVIOUSLY_REGISTERED: &str = "This register has previously been registered";

impl PaymentService {
    /// Builds the CreateKey payload. The device id is the token plus a
    /// fresh short id so re-enrolling a token never reuses a device id.
    pub fn bind_registration(&self, request: &RegistrationRequest) -> RegistrationPayload {
        let device_token = request.device_token.trim().to_string();
        RegistrationPayload {
            merchant_id: request.merchant_id.trim().to_string(),
            device_id: format!("{}-{}", device_token, nanoid::nanoid!(10)),
            device_token,
            operator_id: self.identity.operator_id.clone(),
            firmware_version: self.identity.firmware_version.clone(),
            pos_vendor: self.identity.pos_vendor.clone(),
            tracking_data: String::new(),
            signature: String::new(),
        }
    }

    /// Enrolls the register that `pending` came from.
    pub async fn register(&self, request: &RegistrationRequest, pending: &PaymentRequest) -> RegistrationOutcome {
        let mut payload = self.bind_registration(request);
        if let Err(message) = validate(&payload) {
            return RegistrationOutcome::Rejected {
                reason: RejectionReason::InvalidRequest,
                outcome: rejected(message),
            };
        }

        // no key exists yet, so CreateKey is signed with the device token
        payload.signature = sign_message(&payload, &payload.device_token);

        let response = match self.gateway.register(&payload).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("registration of token {} failed: {}", mask_secret(&payload.device_token), e);
                return RegistrationOutcome::Failed {
                    outcome: NormalizedOutcome::failed(e.to_string()),
                };
            }
        };

        let outcome = classify(OperationType::Registration, &response.code);
        if !outcome.is_approved() {
            tracing::warn!(
                "registration of token {} declined: {}",
                mask_secret(&payload.device_token),
                outcome.log_message
            );
            let reason = match response.code.as_str() {
                DEVICE_TOKEN_NOT_FOUND => RejectionReason::DeviceTokenNotFound,
                DEVICE_TOKEN_ALREADY_USED => RejectionReason::DeviceTokenAlreadyUsed,
                _ => RejectionReason::GatewayRejected,
            };
            return RegistrationOutcome::Rejected { reason, outcome };
        }

        if response.key.is_empty() {
            tracing::error!("gateway approved registration without issuing a key");
            return RegistrationOutcome::Failed {
                outcome: NormalizedOutcome::failed("registration approved without a signing key"),
            };
        }

        let terminal = Terminal::new(
            &response.key,
            &payload.device_id,
            &payload.merchant_id,
            &pending.origin_domain,
            &pending.pos_register_id,
        );

        match self.directory.insert(&terminal, &self.created_by).await {
            Ok(()) => {
                tracing::info!(
                    "registered gateway device {} for {} / {}",
                    terminal.masked_device_id(),
                    terminal.origin_domain,
                    terminal.pos_register_id
                );
                RegistrationOutcome::Enrolled { terminal, outcome }
            }
            Err(DirectoryError::DuplicateRegistration { .. }) => {
                tracing::warn!(
                    "{} / {} is already registered; keeping the existing terminal",
                    terminal.origin_domain,
                    terminal.pos_register_id
                );
                RegistrationOutcome::Rejected {
                    reason: RejectionReason::PreviouslyRegistered,
                    outcome: NormalizedOutcome {
                        status: OutcomeStatus::Declined,
                        code: Some(response.code),
                        customer_message: PREVIOUSLY_REGISTERED.to_string(),
                        log_message: "duplicate registration rejected by terminal directory".to_string(),
                    },
                }
            }
            Err(e) => {
                tracing::error!("unable to store terminal: {}", e);
                RegistrationOutcome::Failed {
                    outcome: NormalizedOutcome::failed(e.to_string()),
                }
            }
        }
    }
}

fn validate(payload: &RegistrationPayload) -> Result<(), &'static str> {
    if payload.device_token.is_empty() {
        return Err("A device token is required");
    }
    if payload.merchant_id.is_empty() {
        return Err("A merchant id is required");
    }
    Ok(())
}

fn rejected(message: &str) -> NormalizedOutcome {
    NormalizedOutcome {
        status: OutcomeStatus::Declined,
        code: None,
        customer_message: message.to_string(),
        log_message: message.to_string(),
    }
}
