use crate::domain::terminal::Terminal;
use crate::error::DirectoryError;
use sqlx::{PgPool, Row};

/// Lookup and insert-once store for registered terminals, keyed by
/// (origin domain, POS register id).
#[async_trait::async_trait]
pub trait TerminalDirectory: Send + Sync {
    /// `Ok(None)` means the register still needs enrolling.
    async fn find(&self, origin_domain: &str, pos_register_id: &str) -> Result<Option<Terminal>, DirectoryError>;

    /// Fails with `DuplicateRegistration` when the key is already taken.
    async fn insert(&self, terminal: &Terminal, created_by: &str) -> Result<(), DirectoryError>;

    async fn health_check(&self) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct TerminalsRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl TerminalDirectory for TerminalsRepo {
    async fn find(&self, origin_domain: &str, pos_register_id: &str) -> Result<Option<Terminal>, DirectoryError> {
        let row = sqlx::query(
            r#"
            SELECT fxl_register_id, fxl_seller_id, fxl_device_signing_key, origin_domain, vend_register_id
            FROM oxipay_vend_map
            WHERE origin_domain = $1 AND vend_register_id = $2
            "#,
        )
        .bind(origin_domain)
        .bind(pos_register_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DirectoryError::Storage(e.into()))?;

        Ok(row.map(|r| Terminal {
            gateway_device_id: r.get("fxl_register_id"),
            seller_id: r.get("fxl_seller_id"),
            signing_key: r.get("fxl_device_signing_key"),
            origin_domain: r.get("origin_domain"),
            pos_register_id: r.get("vend_register_id"),
        }))
    }

    async fn insert(&self, terminal: &Terminal, created_by: &str) -> Result<(), DirectoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO oxipay_vend_map (
                fxl_register_id, fxl_seller_id, fxl_device_signing_key,
                origin_domain, vend_register_id, created_by
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&terminal.gateway_device_id)
        .bind(&terminal.seller_id)
        .bind(&terminal.signing_key)
        .bind(&terminal.origin_domain)
        .bind(&terminal.pos_register_id)
        .bind(created_by)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DirectoryError::DuplicateRegistration {
                    origin_domain: terminal.origin_domain.clone(),
                    pos_register_id: terminal.pos_register_id.clone(),
                })
            }
            Err(e) => Err(DirectoryError::Storage(e.into())),
        }
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
