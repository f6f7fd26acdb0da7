use pos_finance_proxy::config::{AppConfig, GatewayMode, StorageMode};
use pos_finance_proxy::gateways::http::HttpGateway;
use pos_finance_proxy::gateways::mock::MockGateway;
use pos_finance_proxy::gateways::FinanceGateway;
use pos_finance_proxy::http::routes::router;
use pos_finance_proxy::repo::memory::{InMemoryPendingRequests, InMemoryTerminalDirectory};
use pos_finance_proxy::repo::pending_requests_repo::{PendingRequestStore, RedisPendingRequests};
use pos_finance_proxy::repo::terminals_repo::{TerminalDirectory, TerminalsRepo};
use pos_finance_proxy::service::payment_service::PaymentService;
use pos_finance_proxy::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let (directory, pending_requests): (Arc<dyn TerminalDirectory>, Arc<dyn PendingRequestStore>) =
        match cfg.storage_mode {
            StorageMode::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(&cfg.database_url)
                    .await?;

                sqlx::migrate!("./migrations").run(&pool).await?;

                (
                    Arc::new(TerminalsRepo { pool }),
                    Arc::new(RedisPendingRequests {
                        redis_client: redis::Client::open(cfg.redis_url.clone())?,
                        ttl_secs: cfg.session_ttl_secs,
                    }),
                )
            }
            StorageMode::Memory => {
                tracing::warn!("using in-memory storage; terminals are lost on restart");
                (
                    Arc::new(InMemoryTerminalDirectory::new()),
                    Arc::new(InMemoryPendingRequests::new(Duration::from_secs(cfg.session_ttl_secs))),
                )
            }
        };

    let gateway: Arc<dyn FinanceGateway> = match cfg.gateway_mode {
        GatewayMode::Http => Arc::new(HttpGateway::new(&cfg.gateway_base_url, cfg.gateway_timeout_ms)),
        GatewayMode::Mock => {
            tracing::warn!("using the mock finance gateway");
            Arc::new(MockGateway::new(&cfg.mock_gateway_key))
        }
    };
    tracing::info!("finance gateway: {} ({})", gateway.name(), cfg.gateway_base_url);

    let payment_service = PaymentService {
        directory,
        gateway,
        identity: cfg.identity.clone(),
        created_by: cfg.created_by.clone(),
    };

    let state = AppState {
        payment_service,
        pending_requests,
        session_ttl_secs: cfg.session_ttl_secs,
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
