use crate::domain::payment::PaymentRequest;
use anyhow::Result;
use redis::AsyncCommands;

/// Parks a payment request while its register is enrolled.
///
/// `suspend` hands back an opaque token; `resume` reads the request back
/// without consuming it so a failed enrollment can be retried.
#[async_trait::async_trait]
pub trait PendingRequestStore: Send + Sync {
    async fn suspend(&self, request: &PaymentRequest) -> Result<String>;

    async fn resume(&self, token: &str) -> Result<Option<PaymentRequest>>;

    async fn discard(&self, token: &str) -> Result<()>;

    async fn health_check(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct RedisPendingRequests {
    pub redis_client: redis::Client,
    pub ttl_secs: u64,
}

impl RedisPendingRequests {
    fn key(token: &str) -> String {
        format!("pending_request:{}", token)
    }
}

#[async_trait::async_trait]
impl PendingRequestStore for RedisPendingRequests {
    async fn suspend(&self, request: &PaymentRequest) -> Result<String> {
        let token = uuid::Uuid::new_v4().to_string();
        let body = serde_json::to_string(request)?;
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(&token), body, self.ttl_secs).await?;
        Ok(token)
    }

    async fn resume(&self, token: &str) -> Result<Option<PaymentRequest>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let body: Option<String> = conn.get(Self::key(token)).await?;
        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    async fn discard(&self, token: &str) -> Result<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(Self::key(token)).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
