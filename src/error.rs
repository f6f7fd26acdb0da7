use thiserror::Error;

/// Transport-level failures talking to the finance gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway unreachable: {0}")]
    Unreachable(String),
    #[error("gateway did not answer within {0} ms")]
    Timeout(u64),
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("a terminal is already registered for {origin_domain} / {pos_register_id}")]
    DuplicateRegistration {
        origin_domain: String,
        pos_register_id: String,
    },
    #[error("terminal storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Input that cannot be turned into a gateway request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid request field `{field}`: {reason}")]
pub struct InvalidRequest {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidRequest {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
