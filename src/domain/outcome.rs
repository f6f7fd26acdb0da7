use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Approved,
    Declined,
    Failed,
    Unknown,
    Cancelled,
}

impl OutcomeStatus {
    /// Status vocabulary the POS payment flow understands.
    pub fn pos_status(self) -> &'static str {
        match self {
            OutcomeStatus::Approved => "ACCEPTED",
            OutcomeStatus::Declined => "DECLINED",
            OutcomeStatus::Failed => "FAILED",
            OutcomeStatus::Unknown => "UNKNOWN",
            OutcomeStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedOutcome {
    pub status: OutcomeStatus,
    /// Gateway response code the outcome was derived from, if any.
    pub code: Option<String>,
    pub customer_message: String,
    pub log_message: String,
}

pub const PROCESSING_PROBLEM: &str = "There was a problem processing the request";
pub const SIGNATURE_MISMATCH: &str = "signature mismatch";

impl NormalizedOutcome {
    pub fn failed(log_message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            code: None,
            customer_message: PROCESSING_PROBLEM.to_string(),
            log_message: log_message.into(),
        }
    }

    /// The gateway may or may not have acted on the request.
    pub fn unknown(log_message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Unknown,
            code: None,
            customer_message: "The gateway did not answer in time. Check the transaction before retrying"
                .to_string(),
            log_message: log_message.into(),
        }
    }

    pub fn signature_mismatch(code: Option<String>) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            code,
            customer_message: SIGNATURE_MISMATCH.to_string(),
            log_message: "gateway response failed signature verification".to_string(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == OutcomeStatus::Approved
    }
}
