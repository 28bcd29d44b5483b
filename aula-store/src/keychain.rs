//! Password lookup and storage.
//!
//! The password is read from `AULA_PASSWORD` when set, otherwise from the
//! system keychain (service `aula`, account = username):
//! - macOS: Keychain Services
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)

use keyring::Entry;
use tracing::debug;

use crate::error::StoreError;

/// Keychain service name.
pub const SERVICE: &str = "aula";

/// Environment variable that overrides the keychain.
pub const PASSWORD_ENV: &str = "AULA_PASSWORD";

fn entry(username: &str) -> Result<Entry, StoreError> {
    Entry::new(SERVICE, username)
        .map_err(|e| StoreError::Keychain(format!("Failed to create keychain entry: {e}")))
}

/// Stores a password in the system keychain.
///
/// # Errors
///
/// Returns an error if the keychain operation fails.
pub fn store_password(username: &str, password: &str) -> Result<(), StoreError> {
    entry(username)?
        .set_password(password)
        .map_err(|e| StoreError::Keychain(format!("Failed to store password: {e}")))?;
    debug!(username, "Password stored in keychain");
    Ok(())
}

/// Reads a password from the system keychain.
///
/// Returns `None` if nothing (or an empty value) is stored, or the keychain is
/// unavailable.
pub fn get_password(username: &str) -> Option<String> {
    let password = entry(username).ok()?.get_password().ok()?;
    if password.is_empty() {
        return None;
    }
    debug!(username, "Password retrieved from keychain");
    Some(password)
}

/// Deletes a stored password. A missing entry is not an error.
///
/// # Errors
///
/// Returns an error if the deletion fails for another reason.
pub fn delete_password(username: &str) -> Result<(), StoreError> {
    match entry(username)?.delete_credential() {
        Ok(()) => {
            debug!(username, "Password deleted from keychain");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(StoreError::Keychain(format!("Failed to delete password: {e}"))),
    }
}

/// Resolves the password: environment first, then keychain.
pub fn resolve_password(username: &str) -> Option<String> {
    resolve_with(std::env::var(PASSWORD_ENV).ok(), || get_password(username))
}

fn resolve_with(env_value: Option<String>, keychain: impl FnOnce() -> Option<String>) -> Option<String> {
    match env_value {
        Some(value) if !value.is_empty() => {
            debug!("Password taken from environment");
            Some(value)
        }
        _ => keychain(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_wins() {
        let pw = resolve_with(Some("from-env".to_string()), || Some("from-keychain".to_string()));
        assert_eq!(pw.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_empty_env_falls_through() {
        let pw = resolve_with(Some(String::new()), || Some("from-keychain".to_string()));
        assert_eq!(pw.as_deref(), Some("from-keychain"));
        assert!(resolve_with(None, || None).is_none());
    }
}
