use crate::error::InvalidRequest;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A payment or refund intent received from the POS.
///
/// Serializable so the HTTP layer can park it in a session while the
/// register is enrolled, then replay it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount in minor units. Negative means refund.
    pub amount_minor: i64,
    pub origin_domain: String,
    pub pos_register_id: String,
    pub sale_id: Option<String>,
    pub pre_approval_code: Option<String>,
    /// Gateway purchase number a refund adjusts.
    pub purchase_number: Option<String>,
}

impl PaymentRequest {
    pub fn new(amount: &str, origin_domain: &str, pos_register_id: &str) -> Result<Self, InvalidRequest> {
        let origin_domain = origin_domain.trim();
        if origin_domain.is_empty() {
            return Err(InvalidRequest::new("origin", "origin is required"));
        }
        let pos_register_id = pos_register_id.trim();
        if pos_register_id.is_empty() {
            return Err(InvalidRequest::new("register_id", "register_id is required"));
        }

        Ok(Self {
            amount_minor: to_minor_units(amount)?,
            origin_domain: origin_domain.to_string(),
            pos_register_id: pos_register_id.to_string(),
            sale_id: None,
            pre_approval_code: None,
            purchase_number: None,
        })
    }

    pub fn with_sale_id(mut self, sale_id: Option<String>) -> Self {
        self.sale_id = non_empty(sale_id);
        self
    }

    pub fn with_pre_approval_code(mut self, code: Option<String>) -> Self {
        self.pre_approval_code = non_empty(code);
        self
    }

    pub fn with_purchase_number(mut self, purchase_number: Option<String>) -> Self {
        self.purchase_number = non_empty(purchase_number);
        self
    }

    pub fn is_refund(&self) -> bool {
        self.amount_minor < 0
    }
}

/// Converts a decimal major-unit amount ("44.00") to minor units (4400),
/// truncating anything below one minor unit. The magnitude must fit an
/// `i64` so a refund amount can always be sent as its absolute value.
pub fn to_minor_units(amount: &str) -> Result<i64, InvalidRequest> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(InvalidRequest::new("amount", "amount is required"));
    }

    let major = Decimal::from_str(amount)
        .map_err(|e| InvalidRequest::new("amount", format!("`{}` is not a decimal amount: {}", amount, e)))?;

    major
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|minor| minor.trunc())
        .and_then(|minor| minor.to_i64())
        .filter(|minor| minor.checked_abs().is_some())
        .ok_or_else(|| InvalidRequest::new("amount", format!("`{}` is out of range", amount)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
