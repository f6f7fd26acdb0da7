use crate::domain::payment::PaymentRequest;
use crate::domain::terminal::Terminal;
use crate::error::DirectoryError;
use crate::repo::pending_requests_repo::PendingRequestStore;
use crate::repo::terminals_repo::TerminalDirectory;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Process-local terminal directory for development and tests.
///
/// Only safe for a single instance: uniqueness is enforced under the
/// write lock, not by shared storage.
#[derive(Clone, Default)]
pub struct InMemoryTerminalDirectory {
    inner: Arc<RwLock<HashMap<(String, String), (Terminal, String)>>>,
}

impl InMemoryTerminalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn created_by(&self, origin_domain: &str, pos_register_id: &str) -> Option<String> {
        let read = self.inner.read().await;
        read.get(&(origin_domain.to_string(), pos_register_id.to_string()))
            .map(|(_, created_by)| created_by.clone())
    }
}

#[async_trait::async_trait]
impl TerminalDirectory for InMemoryTerminalDirectory {
    async fn find(&self, origin_domain: &str, pos_register_id: &str) -> Result<Option<Terminal>, DirectoryError> {
        let read = self.inner.read().await;
        Ok(read
            .get(&(origin_domain.to_string(), pos_register_id.to_string()))
            .map(|(terminal, _)| terminal.clone()))
    }

    async fn insert(&self, terminal: &Terminal, created_by: &str) -> Result<(), DirectoryError> {
        let mut write = self.inner.write().await;
        match write.entry((terminal.origin_domain.clone(), terminal.pos_register_id.clone())) {
            Entry::Occupied(_) => Err(DirectoryError::DuplicateRegistration {
                origin_domain: terminal.origin_domain.clone(),
                pos_register_id: terminal.pos_register_id.clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert((terminal.clone(), created_by.to_string()));
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
pub struct InMemoryPendingRequests {
    inner: Arc<RwLock<HashMap<String, (Instant, PaymentRequest)>>>,
    ttl: Duration,
}

impl InMemoryPendingRequests {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }
}

#[async_trait::async_trait]
impl PendingRequestStore for InMemoryPendingRequests {
    async fn suspend(&self, request: &PaymentRequest) -> anyhow::Result<String> {
        let token = uuid::Uuid::new_v4().to_string();
        let mut write = self.inner.write().await;
        write.retain(|_, (stored_at, _)| stored_at.elapsed() <= self.ttl);
        write.insert(token.clone(), (Instant::now(), request.clone()));
        Ok(token)
    }

    async fn resume(&self, token: &str) -> anyhow::Result<Option<PaymentRequest>> {
        let read = self.inner.read().await;
        Ok(read
            .get(token)
            .filter(|(stored_at, _)| stored_at.elapsed() <= self.ttl)
            .map(|(_, request)| request.clone()))
    }

    async fn discard(&self, token: &str) -> anyhow::Result<()> {
        self.inner.write().await.remove(token);
        Ok(())
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
