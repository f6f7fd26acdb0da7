use crate::error::GatewayError;
use crate::gateways::{
    AuthorisationPayload, FinanceGateway, GatewayResponse, RegistrationPayload, SalesAdjustmentPayload,
    CREATE_KEY_PATH, PROCESS_AUTHORISATION_PATH, PROCESS_SALES_ADJUSTMENT_PATH,
};
use serde::Serialize;
use std::time::Duration;

/// Talks to the finance gateway's REST API.
///
/// `timeout_ms` of `None` leaves requests unbounded.
pub struct HttpGateway {
    pub base_url: String,
    pub timeout_ms: Option<u64>,
    pub client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout_ms: Option<u64>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_ms,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, payload: &T) -> Result<GatewayResponse, GatewayError> {
        let url = self.endpoint(path);
        tracing::info!("POST to {}", url);

        let mut request = self.client.post(&url).json(payload);
        if let Some(ms) = self.timeout_ms {
            request = request.timeout(Duration::from_millis(ms));
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        tracing::debug!("{} answered HTTP {}", path, status.as_u16());

        serde_json::from_str::<GatewayResponse>(&body).map_err(|e| {
            tracing::error!("unparseable {} response (HTTP {}): {}", path, status.as_u16(), e);
            GatewayError::InvalidResponse(format!("HTTP {}: {}", status.as_u16(), e))
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        match self.timeout_ms {
            Some(ms) if e.is_timeout() => GatewayError::Timeout(ms),
            _ => GatewayError::Unreachable(e.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl FinanceGateway for HttpGateway {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn register(&self, payload: &RegistrationPayload) -> Result<GatewayResponse, GatewayError> {
        self.post(CREATE_KEY_PATH, payload).await
    }

    async fn authorize(&self, payload: &AuthorisationPayload) -> Result<GatewayResponse, GatewayError> {
        self.post(PROCESS_AUTHORISATION_PATH, payload).await
    }

    async fn adjust_sale(&self, payload: &SalesAdjustmentPayload) -> Result<GatewayResponse, GatewayError> {
        self.post(PROCESS_SALES_ADJUSTMENT_PATH, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let gateway = HttpGateway::new("https://gateway.test/webapi/v1/", None);
        assert_eq!(
            gateway.endpoint(CREATE_KEY_PATH),
            "https://gateway.test/webapi/v1/CreateKey"
        );
    }
}
