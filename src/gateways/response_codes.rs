//! Gateway response code tables.
//!
//! One table per operation. Each lookup is total: a code the table does
//! not know resolves to that table's internal-error entry.

use crate::domain::outcome::{NormalizedOutcome, OutcomeStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Authorisation,
    SalesAdjustment,
    Registration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCode {
    pub code: &'static str,
    pub status: OutcomeStatus,
    pub log_message: &'static str,
    pub customer_message: &'static str,
}

pub const INTERNAL_ERROR_CODE: &str = "EISE01";

pub const AUTHORISATION_APPROVED: &str = "SPRA01";
pub const SALES_ADJUSTMENT_APPROVED: &str = "SPSA01";
pub const REGISTRATION_APPROVED: &str = "SCRK01";
pub const DEVICE_TOKEN_NOT_FOUND: &str = "FCRK01";
pub const DEVICE_TOKEN_ALREADY_USED: &str = "FCRK02";

const SUPPORT: &str = "Please contact gateway support for further assistance";

const fn entry(
    code: &'static str,
    status: OutcomeStatus,
    log_message: &'static str,
    customer_message: &'static str,
) -> ResponseCode {
    ResponseCode {
        code,
        status,
        log_message,
        customer_message,
    }
}

use OutcomeStatus::{Approved, Cancelled, Declined, Failed};

const SIGNATURE_ERROR: ResponseCode = entry(
    "ESIG01",
    Failed,
    "Signature mismatch error. Has the terminal changed? Try removing the key for the device",
    SUPPORT,
);

const INTERNAL_ERROR: ResponseCode = entry(INTERNAL_ERROR_CODE, Failed, "Server Error", SUPPORT);

pub static AUTHORISATION: &[ResponseCode] = &[
    entry(AUTHORISATION_APPROVED, Approved, "APPROVED", "APPROVED"),
    entry(
        "FPRA01",
        Declined,
        "Declined due to internal risk assessment against the customer",
        "Do not try again",
    ),
    entry(
        "FPRA02",
        Declined,
        "Declined due to insufficient funds for the deposit",
        "Please call customer support",
    ),
    entry(
        "FPRA03",
        Failed,
        "Declined as communication to the bank is currently unavailable",
        "Please try again shortly. Communication to the bank is unavailable",
    ),
    entry(
        "FPRA04",
        Declined,
        "Declined because the customer limit has been exceeded",
        "Please contact customer support",
    ),
    entry(
        "FPRA05",
        Declined,
        "Declined due to negative payment history for the customer",
        "Please contact customer support for more information",
    ),
    entry(
        "FPRA06",
        Declined,
        "Declined because the credit-card used for the deposit is expired",
        "Declined because the credit-card used for the deposit is expired",
    ),
    entry(
        "FPRA07",
        Declined,
        "Declined because supplied POSTransactionRef has already been processed",
        "We have seen this Transaction ID before, please try again",
    ),
    entry(
        "FPRA08",
        Declined,
        "Declined because the instalment amount was below the minimum threshold",
        "Transaction below minimum",
    ),
    entry(
        "FPRA09",
        Declined,
        "Declined because purchase amount exceeded pre-approved amount",
        "Please contact customer support",
    ),
    entry(
        "FPRA21",
        Declined,
        "The Payment Code was not found",
        "This is not a valid Payment Code",
    ),
    entry(
        "FPRA22",
        Declined,
        "The Payment Code has already been used",
        "The Payment Code has already been used",
    ),
    entry(
        "FPRA23",
        Declined,
        "The Payment Code has expired",
        "The Payment Code has expired",
    ),
    entry(
        "FPRA24",
        Declined,
        "The Payment Code has been cancelled",
        "Payment Code has been cancelled. Please try again with a new Payment Code",
    ),
    entry("FPRA99", Declined, "DECLINED by gateway", "DECLINED"),
    entry("CANCEL", Cancelled, "Cancelled by the customer", "CANCELLED"),
    entry(
        "EAUT01",
        Failed,
        "Authentication to gateway error. The terminal may need registering again",
        SUPPORT,
    ),
    entry(
        "EVAL02",
        Failed,
        "Request is invalid",
        "The request to the gateway was invalid. You can try again with a different Payment Code",
    ),
    SIGNATURE_ERROR,
    INTERNAL_ERROR,
];

pub static SALES_ADJUSTMENT: &[ResponseCode] = &[
    entry(SALES_ADJUSTMENT_APPROVED, Approved, "APPROVED", "APPROVED"),
    entry(
        "FPSA01",
        Declined,
        "Unable to find the specified POS transaction reference",
        "Unable to find the specified POS transaction reference",
    ),
    entry(
        "FPSA02",
        Failed,
        "This contract has already been completed",
        "This contract has already been completed",
    ),
    entry(
        "FPSA03",
        Failed,
        "This contract has previously been cancelled and all payments collected have been refunded to the customer",
        "This contract has previously been cancelled and all payments collected have been refunded to the customer",
    ),
    entry(
        "FPSA04",
        Failed,
        "Sales adjustment cannot be processed for this amount",
        "Sales adjustment cannot be processed for this amount",
    ),
    entry(
        "FPSA05",
        Failed,
        "Unable to process a sales adjustment for this contract",
        "Unable to process a sales adjustment for this contract. Please contact Merchant Services during business hours for further information",
    ),
    entry(
        "FPSA06",
        Failed,
        "Sales adjustment cannot be processed, refer to collections",
        "Sales adjustment cannot be processed. Please call Collections",
    ),
    entry(
        "FPSA07",
        Failed,
        "Sales adjustment cannot be processed at this store",
        "Sales adjustment cannot be processed at this store",
    ),
    entry(
        "FPSA08",
        Failed,
        "Sales adjustment cannot be processed for this transaction. Duplicate receipt number found",
        "Sales adjustment cannot be processed for this transaction. Duplicate receipt number found",
    ),
    entry(
        "FPSA09",
        Failed,
        "Amount must be greater than 0",
        "Amount must be greater than 0",
    ),
    entry("EAUT01", Failed, "Authentication to gateway error", SUPPORT),
    entry("EVAL01", Failed, "Request is invalid", SUPPORT),
    SIGNATURE_ERROR,
    INTERNAL_ERROR,
];

pub static REGISTRATION: &[ResponseCode] = &[
    entry(REGISTRATION_APPROVED, Approved, "Device registered", "Created"),
    entry(
        DEVICE_TOKEN_NOT_FOUND,
        Declined,
        "Device token can't be found in the remote service",
        "This device token can't be found. Check the token and try again",
    ),
    entry(
        DEVICE_TOKEN_ALREADY_USED,
        Declined,
        "Device token has previously been registered",
        "This device token has previously been registered. Request a new token",
    ),
    entry("EVAL01", Failed, "Registration request is invalid", SUPPORT),
    SIGNATURE_ERROR,
    INTERNAL_ERROR,
];

pub fn table(operation: OperationType) -> &'static [ResponseCode] {
    match operation {
        OperationType::Authorisation => AUTHORISATION,
        OperationType::SalesAdjustment => SALES_ADJUSTMENT,
        OperationType::Registration => REGISTRATION,
    }
}

/// Looks up `code`, falling back to the internal-error entry.
pub fn lookup(operation: OperationType, code: &str) -> &'static ResponseCode {
    let entries = table(operation);
    entries
        .iter()
        .find(|e| e.code == code)
        .or_else(|| entries.iter().find(|e| e.code == INTERNAL_ERROR_CODE))
        .unwrap_or(&INTERNAL_ERROR)
}

pub fn classify(operation: OperationType, code: &str) -> NormalizedOutcome {
    let entry = lookup(operation, code);
    let log_message = if entry.code == code {
        entry.log_message.to_string()
    } else {
        format!("{} (unrecognised code `{}`)", entry.log_message, code)
    };

    NormalizedOutcome {
        status: entry.status,
        code: Some(code.to_string()),
        customer_message: entry.customer_message.to_string(),
        log_message,
    }
}
