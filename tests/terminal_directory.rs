use pos_finance_proxy::domain::terminal::Terminal;
use pos_finance_proxy::error::DirectoryError;
use pos_finance_proxy::repo::memory::InMemoryTerminalDirectory;
use pos_finance_proxy::repo::terminals_repo::TerminalDirectory;
use std::sync::Arc;

fn terminal(origin: &str, register: &str, key: &str) -> Terminal {
    Terminal::new(key, "token-abc", "30188105", origin, register)
}

#[tokio::test]
async fn finds_only_the_exact_pair() {
    let directory = InMemoryTerminalDirectory::new();
    directory
        .insert(&terminal("http://pos.example.com", "R1", "k1"), "tests")
        .await
        .unwrap();

    let found = directory.find("http://pos.example.com", "R1").await.unwrap().unwrap();
    assert_eq!(found.signing_key, "k1");
    assert_eq!(found.seller_id, "30188105");

    assert!(directory.find("http://pos.example.com", "R2").await.unwrap().is_none());
    assert!(directory.find("http://other.example.com", "R1").await.unwrap().is_none());
}

#[tokio::test]
async fn second_insert_is_rejected_and_first_wins() {
    let directory = InMemoryTerminalDirectory::new();
    directory
        .insert(&terminal("http://pos.example.com", "R1", "first"), "alice")
        .await
        .unwrap();

    let err = directory
        .insert(&terminal("http://pos.example.com", "R1", "second"), "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::DuplicateRegistration { .. }));

    let kept = directory.find("http://pos.example.com", "R1").await.unwrap().unwrap();
    assert_eq!(kept.signing_key, "first");
    assert_eq!(
        directory.created_by("http://pos.example.com", "R1").await.as_deref(),
        Some("alice")
    );
}

#[tokio::test]
async fn concurrent_inserts_have_exactly_one_winner() {
    let directory = Arc::new(InMemoryTerminalDirectory::new());

    let mut handles = Vec::new();
    for i in 0..16 {
        let directory = directory.clone();
        handles.push(tokio::spawn(async move {
            directory
                .insert(&terminal("http://pos.example.com", "R1", &format!("key-{}", i)), "tests")
                .await
        }));
    }

    let mut successes = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(DirectoryError::DuplicateRegistration { .. }) => duplicates += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(duplicates, 15);
}
