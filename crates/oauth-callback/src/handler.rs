//! OAuth redirect handler.

use crate::fragment::{parse_fragment, ACCESS_TOKEN_FIELD, REFRESH_TOKEN_FIELD};
use crate::{NavigationError, OAuthError, OAuthResult};
use async_trait::async_trait;
use credential_storage::{CredentialStore, SessionTokens};
use relay_protocol_types::ConsumerHandle;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Navigates browser tabs.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, target: &ConsumerHandle, url: &str) -> Result<(), NavigationError>;
}

/// Redirect detection and post-login destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCallbackConfig {
    /// Substring identifying the provider redirect.
    pub redirect_marker: String,
    /// Where the tab goes after a verified login.
    pub post_login_url: String,
}

impl Default for OAuthCallbackConfig {
    fn default() -> Self {
        Self {
            redirect_marker: ".chromiumapp.org/".to_string(),
            post_login_url: "https://www.season.codes".to_string(),
        }
    }
}

/// Completes the OAuth handshake from a redirect URL.
pub struct OAuthCallbackHandler {
    config: OAuthCallbackConfig,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl OAuthCallbackHandler {
    pub fn new(
        config: OAuthCallbackConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            store,
            navigator,
        }
    }

    pub fn config(&self) -> &OAuthCallbackConfig {
        &self.config
    }

    /// Whether a navigation is the provider redirect.
    pub fn is_callback(&self, url: &str) -> bool {
        url.contains(&self.config.redirect_marker)
    }

    /// Extract, persist and verify the session, then leave the redirect page.
    ///
    /// Nothing is written unless both tokens are present and non-empty.
    pub async fn finish(&self, url: &str, target: &ConsumerHandle) -> OAuthResult<SessionTokens> {
        let tokens = extract_tokens(url)?;
        debug!(target = %target, "Extracted session tokens from redirect");

        self.store.set(&tokens).await?;

        let stored = self.store.get().await?;
        if stored.map_or(true, |s| s.is_empty()) {
            warn!(target = %target, "Session readback was empty");
            return Err(OAuthError::PersistenceVerificationFailed);
        }
        info!(target = %target, "Session stored");

        self.navigator
            .navigate(target, &self.config.post_login_url)
            .await?;
        info!(target = %target, url = %self.config.post_login_url, "Navigated to post-login page");

        Ok(tokens)
    }
}

fn extract_tokens(url: &str) -> OAuthResult<SessionTokens> {
    let parsed = Url::parse(url).map_err(|e| OAuthError::InvalidUrl(e.to_string()))?;
    let params = parse_fragment(parsed.fragment().unwrap_or(""))?;

    let access_token = required(&params, ACCESS_TOKEN_FIELD)?;
    let refresh_token = required(&params, REFRESH_TOKEN_FIELD)?;
    Ok(SessionTokens::new(access_token, refresh_token))
}

fn required(params: &HashMap<String, String>, field: &'static str) -> OAuthResult<String> {
    params
        .get(field)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or(OAuthError::MissingCredentials(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use credential_storage::{MemoryCredentialStore, StorageResult};
    use parking_lot::Mutex;

    const REDIRECT: &str = "https://abcdef.chromiumapp.org/#access_token=A&refresh_token=B";

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<(ConsumerHandle, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Navigator for RecordingNavigator {
        async fn navigate(
            &self,
            target: &ConsumerHandle,
            url: &str,
        ) -> Result<(), NavigationError> {
            if self.fail {
                return Err(NavigationError("tab closed".to_string()));
            }
            self.visits.lock().push((target.clone(), url.to_string()));
            Ok(())
        }
    }

    /// Store that accepts writes but never returns them.
    #[derive(Default)]
    struct ForgetfulStore {
        writes: Mutex<u32>,
    }

    #[async_trait]
    impl CredentialStore for ForgetfulStore {
        async fn set(&self, _tokens: &SessionTokens) -> StorageResult<()> {
            *self.writes.lock() += 1;
            Ok(())
        }

        async fn get(&self) -> StorageResult<Option<SessionTokens>> {
            Ok(None)
        }

        async fn remove(&self) -> StorageResult<bool> {
            Ok(false)
        }
    }

    fn handler_with(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<RecordingNavigator>,
    ) -> OAuthCallbackHandler {
        OAuthCallbackHandler::new(OAuthCallbackConfig::default(), store, navigator)
    }

    #[test]
    fn test_is_callback() {
        let handler = handler_with(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNavigator::default()),
        );
        assert!(handler.is_callback(REDIRECT));
        assert!(!handler.is_callback("https://www.season.codes/login"));
        assert!(!handler.is_callback("https://chromiumapp.org.evil.test/"));
    }

    #[tokio::test]
    async fn test_finish_stores_tokens_and_navigates() {
        let store = Arc::new(MemoryCredentialStore::new());
        let navigator = Arc::new(RecordingNavigator::default());
        let handler = handler_with(store.clone(), navigator.clone());

        let tokens = handler.finish(REDIRECT, &"tab9".into()).await.unwrap();

        assert_eq!(tokens, SessionTokens::new("A", "B"));
        assert_eq!(store.get().await.unwrap(), Some(SessionTokens::new("A", "B")));
        assert_eq!(
            *navigator.visits.lock(),
            vec![(ConsumerHandle::from("tab9"), "https://www.season.codes".to_string())]
        );
    }

    #[tokio::test]
    async fn test_missing_refresh_token_writes_nothing() {
        let store = Arc::new(ForgetfulStore::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let handler = handler_with(store.clone(), navigator.clone());

        let result = handler
            .finish("https://x.chromiumapp.org/#access_token=A", &"tab1".into())
            .await;

        assert!(matches!(
            result,
            Err(OAuthError::MissingCredentials(REFRESH_TOKEN_FIELD))
        ));
        assert_eq!(*store.writes.lock(), 0);
        assert!(navigator.visits.lock().is_empty());
    }

    #[tokio::test]
    async fn test_empty_token_counts_as_missing() {
        let store = Arc::new(MemoryCredentialStore::new());
        let handler = handler_with(store.clone(), Arc::new(RecordingNavigator::default()));

        let result = handler
            .finish(
                "https://x.chromiumapp.org/#access_token=&refresh_token=B",
                &"tab1".into(),
            )
            .await;

        assert!(matches!(
            result,
            Err(OAuthError::MissingCredentials(ACCESS_TOKEN_FIELD))
        ));
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_fragment_is_missing_credentials() {
        let handler = handler_with(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNavigator::default()),
        );

        let result = handler
            .finish("https://x.chromiumapp.org/?code=1", &"tab1".into())
            .await;
        assert!(matches!(result, Err(OAuthError::MissingCredentials(_))));
    }

    #[tokio::test]
    async fn test_empty_readback_fails_verification() {
        let store = Arc::new(ForgetfulStore::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let handler = handler_with(store.clone(), navigator.clone());

        let result = handler.finish(REDIRECT, &"tab1".into()).await;

        assert!(matches!(result, Err(OAuthError::PersistenceVerificationFailed)));
        assert_eq!(*store.writes.lock(), 1);
        assert!(navigator.visits.lock().is_empty());
    }

    #[tokio::test]
    async fn test_navigation_failure_is_reported() {
        let navigator = Arc::new(RecordingNavigator {
            fail: true,
            ..Default::default()
        });
        let handler = handler_with(Arc::new(MemoryCredentialStore::new()), navigator);

        let result = handler.finish(REDIRECT, &"tab1".into()).await;
        assert!(matches!(result, Err(OAuthError::Navigation(_))));
    }

    #[tokio::test]
    async fn test_unparseable_url_is_rejected() {
        let handler = handler_with(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(RecordingNavigator::default()),
        );

        let result = handler.finish("not a url .chromiumapp.org/", &"tab1".into()).await;
        assert!(matches!(result, Err(OAuthError::InvalidUrl(_))));
    }
}
