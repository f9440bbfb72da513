//! Storage key constants.

/// Keys of entries in the credential store.
pub struct StorageKeys;

impl StorageKeys {
    /// Session tokens obtained from the OAuth redirect.
    pub const SESSION: &'static str = "session";
}
