//! OAuth redirect handling through the engine.

use super::harness::{settle, TestHarness};
use crate::HostSignal;
use credential_storage::{CredentialStore, SessionTokens};
use relay_protocol_types::ConsumerHandle;

fn navigation(tab: i64, url: &str) -> HostSignal {
    HostSignal::Navigation {
        target: ConsumerHandle::from(tab),
        url: Some(url.to_string()),
        load_complete: false,
    }
}

#[tokio::test]
async fn redirect_stores_session_and_navigates() {
    let harness = TestHarness::start().await;

    harness
        .send(navigation(
            12,
            "https://abc.chromiumapp.org/#access_token=A&refresh_token=B&token_type=bearer",
        ))
        .await;
    settle().await;

    assert_eq!(
        harness.credentials.get().await.unwrap(),
        Some(SessionTokens::new("A", "B"))
    );
    assert_eq!(
        harness.navigator.visits(),
        vec![(
            ConsumerHandle::from("12"),
            "https://www.season.codes".to_string()
        )]
    );
    assert!(harness.notifier.messages().is_empty());

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn redirect_without_refresh_token_notifies_failure() {
    let harness = TestHarness::start().await;

    harness
        .send(navigation(12, "https://abc.chromiumapp.org/#access_token=A"))
        .await;
    settle().await;

    assert!(harness.credentials.get().await.unwrap().is_none());
    assert!(harness.navigator.visits().is_empty());
    assert_eq!(
        harness.notifier.messages(),
        vec!["Authentication failed. Please try again."]
    );

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn ordinary_navigation_is_not_a_callback() {
    let harness = TestHarness::start().await;

    harness
        .send(navigation(
            12,
            "https://www.season.codes/#access_token=A&refresh_token=B",
        ))
        .await;
    settle().await;

    assert!(harness.credentials.get().await.unwrap().is_none());
    assert!(harness.navigator.visits().is_empty());
    assert!(harness.notifier.messages().is_empty());

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn oauth_failure_leaves_delivery_running() {
    let harness = TestHarness::start_connected().await;

    harness
        .send(navigation(1, "https://abc.chromiumapp.org/#refresh_token=B"))
        .await;
    settle().await;
    harness.frame(r#"{"historyId":31}"#).await;

    assert_eq!(
        harness.notifier.messages(),
        vec![
            "Authentication failed. Please try again.",
            "OTP Received: 31"
        ]
    );

    harness.shutdown().await.unwrap();
}
