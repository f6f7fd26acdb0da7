//! Runs against a live Postgres. Set DATABASE_URL and use `--ignored`.

use pos_finance_proxy::domain::terminal::Terminal;
use pos_finance_proxy::error::DirectoryError;
use pos_finance_proxy::repo::terminals_repo::{TerminalDirectory, TerminalsRepo};
use sqlx::postgres::PgPoolOptions;

async fn repo() -> TerminalsRepo {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new().max_connections(4).connect(&url).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    TerminalsRepo { pool }
}

#[tokio::test]
#[ignore]
async fn duplicate_insert_maps_unique_violation() {
    let repo = repo().await;
    let origin = format!("http://pos-{}.example.com", uuid::Uuid::new_v4().simple());

    let first = Terminal::new("first-key", "tok-a", "30188105", &origin, "R1");
    repo.insert(&first, "tests").await.unwrap();

    let second = Terminal::new("second-key", "tok-b", "30188105", &origin, "R1");
    let err = repo.insert(&second, "tests").await.unwrap_err();
    assert!(matches!(err, DirectoryError::DuplicateRegistration { .. }), "{:?}", err);

    let kept = repo.find(&origin, "R1").await.unwrap().unwrap();
    assert_eq!(kept.signing_key, "first-key");
    assert_eq!(kept.gateway_device_id, "tok-a");
    assert!(repo.find(&origin, "R2").await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn health_check_reaches_the_database() {
    repo().await.health_check().await.unwrap();
}
