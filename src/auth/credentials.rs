use anyhow::{Context, Result};
use keyring::Entry;

/// Keychain service name
const SERVICE_NAME: &str = "xrptax";

/// Optional "remember me" storage for the login password, keyed by email,
/// in the OS keychain. The bearer token never goes here - it lives in the
/// session record and expires server-side.
pub struct CredentialStore;

impl CredentialStore {
    /// Remember the password for an email.
    pub fn store(email: &str, password: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Look up a remembered password.
    pub fn get_password(email: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("No remembered password for this email")
    }

    /// Forget a remembered password. Succeeds when nothing was stored.
    pub fn delete(email: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email).context("Failed to create keyring entry")?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }

    pub fn has_credentials(email: &str) -> bool {
        Entry::new(SERVICE_NAME, email)
            .and_then(|entry| entry.get_password())
            .is_ok()
    }
}
