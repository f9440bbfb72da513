//! Credential store trait and stored shapes.

use crate::StorageResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens persisted after a successful OAuth handshake.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl SessionTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// True when either token is blank.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty() || self.refresh_token.is_empty()
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Backend holding the current session.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Replace the stored session.
    async fn set(&self, tokens: &SessionTokens) -> StorageResult<()>;

    /// Read the stored session, if any.
    async fn get(&self) -> StorageResult<Option<SessionTokens>>;

    /// Remove the stored session. Returns `true` if one existed.
    async fn remove(&self) -> StorageResult<bool>;

    /// Check whether a session is stored.
    async fn has_session(&self) -> StorageResult<bool> {
        Ok(self.get().await?.is_some_and(|t| !t.is_empty()))
    }
}
