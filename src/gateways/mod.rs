use crate::error::GatewayError;
use crate::gateways::signature::Signable;
use serde::{Deserialize, Serialize};

pub mod http;
pub mod mock;
pub mod response_codes;
pub mod signature;

pub const CREATE_KEY_PATH: &str = "CreateKey";
pub const PROCESS_AUTHORISATION_PATH: &str = "ProcessAuthorisation";
pub const PROCESS_SALES_ADJUSTMENT_PATH: &str = "ProcessSalesAdjustment";

/// CreateKey request: enrolls a device and exchanges its token for a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    #[serde(rename = "x_merchant_id")]
    pub merchant_id: String,
    #[serde(rename = "x_device_id")]
    pub device_id: String,
    #[serde(rename = "x_device_token")]
    pub device_token: String,
    #[serde(rename = "x_operator_id")]
    pub operator_id: String,
    #[serde(rename = "x_firmware_version")]
    pub firmware_version: String,
    #[serde(rename = "x_pos_vendor")]
    pub pos_vendor: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tracking_data: String,
    #[serde(default)]
    pub signature: String,
}

impl Signable for RegistrationPayload {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("x_merchant_id", self.merchant_id.as_str()),
            ("x_device_id", self.device_id.as_str()),
            ("x_device_token", self.device_token.as_str()),
            ("x_operator_id", self.operator_id.as_str()),
            ("x_firmware_version", self.firmware_version.as_str()),
            ("x_pos_vendor", self.pos_vendor.as_str()),
            ("tracking_data", self.tracking_data.as_str()),
            ("signature", self.signature.as_str()),
        ]
    }
}

/// ProcessAuthorisation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorisationPayload {
    #[serde(rename = "x_merchant_id")]
    pub merchant_id: String,
    #[serde(rename = "x_device_id")]
    pub device_id: String,
    #[serde(rename = "x_operator_id")]
    pub operator_id: String,
    #[serde(rename = "x_firmware_version")]
    pub firmware_version: String,
    #[serde(rename = "x_pos_transaction_ref")]
    pub pos_transaction_ref: String,
    #[serde(rename = "x_pre_approval_code")]
    pub pre_approval_code: String,
    #[serde(rename = "x_finance_amount")]
    pub finance_amount: String,
    #[serde(rename = "x_purchase_amount")]
    pub purchase_amount: String,
    #[serde(default)]
    pub signature: String,
}

impl Signable for AuthorisationPayload {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("x_merchant_id", self.merchant_id.as_str()),
            ("x_device_id", self.device_id.as_str()),
            ("x_operator_id", self.operator_id.as_str()),
            ("x_firmware_version", self.firmware_version.as_str()),
            ("x_pos_transaction_ref", self.pos_transaction_ref.as_str()),
            ("x_pre_approval_code", self.pre_approval_code.as_str()),
            ("x_finance_amount", self.finance_amount.as_str()),
            ("x_purchase_amount", self.purchase_amount.as_str()),
            ("signature", self.signature.as_str()),
        ]
    }
}

/// ProcessSalesAdjustment request (refunds).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesAdjustmentPayload {
    #[serde(rename = "x_pos_transaction_ref")]
    pub pos_transaction_ref: String,
    #[serde(rename = "x_purchase_ref")]
    pub purchase_ref: String,
    #[serde(rename = "x_merchant_id")]
    pub merchant_id: String,
    #[serde(rename = "x_amount", default, skip_serializing_if = "String::is_empty")]
    pub amount: String,
    #[serde(rename = "x_device_id", default, skip_serializing_if = "String::is_empty")]
    pub device_id: String,
    #[serde(rename = "x_operator_id", default, skip_serializing_if = "String::is_empty")]
    pub operator_id: String,
    #[serde(rename = "x_firmware_version", default, skip_serializing_if = "String::is_empty")]
    pub firmware_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tracking_data: String,
    #[serde(default)]
    pub signature: String,
}

impl Signable for SalesAdjustmentPayload {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("x_pos_transaction_ref", self.pos_transaction_ref.as_str()),
            ("x_purchase_ref", self.purchase_ref.as_str()),
            ("x_merchant_id", self.merchant_id.as_str()),
            ("x_amount", self.amount.as_str()),
            ("x_device_id", self.device_id.as_str()),
            ("x_operator_id", self.operator_id.as_str()),
            ("x_firmware_version", self.firmware_version.as_str()),
            ("tracking_data", self.tracking_data.as_str()),
            ("signature", self.signature.as_str()),
        ]
    }
}

/// Reply shared by all three operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    #[serde(
        rename = "x_purchase_number",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "String::is_empty"
    )]
    pub purchase_number: String,
    #[serde(
        rename = "x_status",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "String::is_empty"
    )]
    pub status: String,
    #[serde(rename = "x_code", default, deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(rename = "x_message", default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(
        rename = "x_key",
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "String::is_empty"
    )]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub signature: String,
}

impl Signable for GatewayResponse {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("x_purchase_number", self.purchase_number.as_str()),
            ("x_status", self.status.as_str()),
            ("x_code", self.code.as_str()),
            ("x_message", self.message.as_str()),
            ("x_key", self.key.as_str()),
            ("signature", self.signature.as_str()),
        ]
    }
}

impl GatewayResponse {
    pub fn purchase_number(&self) -> Option<String> {
        Some(self.purchase_number.clone()).filter(|p| !p.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[async_trait::async_trait]
pub trait FinanceGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn register(&self, payload: &RegistrationPayload) -> Result<GatewayResponse, GatewayError>;

    async fn authorize(&self, payload: &AuthorisationPayload) -> Result<GatewayResponse, GatewayError>;

    async fn adjust_sale(&self, payload: &SalesAdjustmentPayload) -> Result<GatewayResponse, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_payload_uses_gateway_field_names() {
        let payload = RegistrationPayload {
            merchant_id: "30188105".to_string(),
            device_id: "01SUCCES-abc".to_string(),
            device_token: "01SUCCES".to_string(),
            signature: "ff".to_string(),
            ..Default::default()
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["x_merchant_id"], "30188105");
        assert_eq!(v["x_device_token"], "01SUCCES");
        assert_eq!(v["signature"], "ff");
        assert!(v.get("tracking_data").is_none());
    }

    #[test]
    fn response_parses_with_null_tracking_data() {
        let body = r#"{"x_purchase_number":"52011595","x_status":"Success","x_code":"SPRA01","x_message":"Approved","signature":"84b2","tracking_data":null}"#;
        let parsed: GatewayResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.code, "SPRA01");
        assert_eq!(parsed.purchase_number().as_deref(), Some("52011595"));
        assert!(parsed.key.is_empty());
    }

    #[test]
    fn response_plaintext_covers_prefixed_fields_only() {
        let response = GatewayResponse {
            purchase_number: "1".to_string(),
            code: "SPRA01".to_string(),
            message: "Approved".to_string(),
            signature: "abc".to_string(),
            ..Default::default()
        };
        assert_eq!(
            response.canonical_plaintext(),
            "x_codeSPRA01x_messageApprovedx_purchase_number1"
        );
    }
}
