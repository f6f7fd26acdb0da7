use std::fmt;

/// A POS register's enrollment with the finance gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct Terminal {
    pub gateway_device_id: String,
    pub seller_id: String,
    pub signing_key: String,
    pub origin_domain: String,
    pub pos_register_id: String,
}

impl Terminal {
    pub fn new(
        signing_key: &str,
        gateway_device_id: &str,
        seller_id: &str,
        origin_domain: &str,
        pos_register_id: &str,
    ) -> Self {
        Self {
            gateway_device_id: gateway_device_id.to_string(),
            seller_id: seller_id.to_string(),
            signing_key: signing_key.to_string(),
            origin_domain: origin_domain.to_string(),
            pos_register_id: pos_register_id.to_string(),
        }
    }

    /// Device id for log lines. It embeds the enrollment device token.
    pub fn masked_device_id(&self) -> String {
        mask_secret(&self.gateway_device_id)
    }
}

// signing_key stays out of logs
impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal")
            .field("gateway_device_id", &self.gateway_device_id)
            .field("seller_id", &self.seller_id)
            .field("signing_key", &"<redacted>")
            .field("origin_domain", &self.origin_domain)
            .field("pos_register_id", &self.pos_register_id)
            .finish()
    }
}

/// Masks a secret for log output, keeping the first two characters.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(2).collect();
    format!("{}***", visible)
}
