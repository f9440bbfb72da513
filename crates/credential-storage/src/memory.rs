//! In-memory credential store.

use crate::{CredentialStore, SessionTokens, StorageResult};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Credential store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: Mutex<Option<SessionTokens>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn set(&self, tokens: &SessionTokens) -> StorageResult<()> {
        *self.session.lock() = Some(tokens.clone());
        Ok(())
    }

    async fn get(&self) -> StorageResult<Option<SessionTokens>> {
        Ok(self.session.lock().clone())
    }

    async fn remove(&self) -> StorageResult<bool> {
        Ok(self.session.lock().take().is_some())
    }
}
