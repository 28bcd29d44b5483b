//! UNI-login credentials.

use crate::error::AuthError;

/// Username and password for the identity broker.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The UNI-login username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Fails if either part is blank.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] naming the blank part.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.username.trim().is_empty() {
            return Err(AuthError::MissingCredentials("username is empty".to_string()));
        }
        if self.password.is_empty() {
            return Err(AuthError::MissingCredentials("password is empty".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials::new("anna0001", "hemmelig");
        let debug = format!("{creds:?}");
        assert!(debug.contains("anna0001"));
        assert!(!debug.contains("hemmelig"));
    }

    #[test]
    fn test_validate() {
        assert!(Credentials::new("anna0001", "x").validate().is_ok());
        assert!(matches!(
            Credentials::new(" ", "x").validate(),
            Err(AuthError::MissingCredentials(_))
        ));
        assert!(matches!(
            Credentials::new("anna0001", "").validate(),
            Err(AuthError::MissingCredentials(_))
        ));
    }
}
