//! Session commands (status, logout).

use credential_storage::{CredentialStore, FileCredentialStore};
use relay_config_and_utils::Paths;

/// Print whether a session is stored.
pub async fn check_status(paths: &Paths) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileCredentialStore::new(paths.credentials_file());

    if store.has_session().await? {
        println!("Logged in");
    } else {
        println!("Not logged in");
    }
    println!("  Credentials: {}", store.path().display());

    Ok(())
}

/// Remove the stored session.
pub async fn logout(paths: &Paths) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileCredentialStore::new(paths.credentials_file());

    if store.remove().await? {
        println!("Logged out");
    } else {
        println!("No session stored");
    }

    Ok(())
}
