//! Upstream base URLs.

use serde::{Deserialize, Serialize};

/// Identity broker entry page.
pub const LOGIN_ENTRY: &str = "https://login.aula.dk/auth/login.php?type=unilogin";
/// Landing page that marks a finished login.
pub const PORTAL_HOME: &str = "https://www.aula.dk:443/portal/";
/// Portal API prefix; the numeric version is appended.
pub const API_BASE: &str = "https://www.aula.dk/api/v";
/// MinUddannelse widget back-end (task list, weekly letter).
pub const MIN_UDDANNELSE_API: &str = "https://api.minuddannelse.net/aula";
/// Meebook widget back-end (weekly plan).
pub const MEEBOOK_API: &str = "https://app.meebook.com/aulaapi";
/// Systematic widget back-end (reminders).
pub const SYSTEMATIC_API: &str = "https://systematic-momo.dk/api/aula";

/// Every upstream base URL the client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// Identity broker entry page.
    pub login_entry: String,
    /// Landing page that marks a finished login.
    pub portal_home: String,
    /// Portal API prefix, e.g. `https://www.aula.dk/api/v`.
    pub api_base: String,
    /// MinUddannelse base URL.
    pub min_uddannelse: String,
    /// Meebook base URL.
    pub meebook: String,
    /// Systematic base URL.
    pub systematic: String,
}

impl Endpoints {
    /// Points every endpoint at one origin. Used against local mock servers.
    pub fn with_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            login_entry: format!("{origin}/auth/login.php?type=unilogin"),
            portal_home: format!("{origin}/portal/"),
            api_base: format!("{origin}/api/v"),
            min_uddannelse: format!("{origin}/minuddannelse"),
            meebook: format!("{origin}/meebook"),
            systematic: format!("{origin}/systematic"),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login_entry: LOGIN_ENTRY.to_string(),
            portal_home: PORTAL_HOME.to_string(),
            api_base: API_BASE.to_string(),
            min_uddannelse: MIN_UDDANNELSE_API.to_string(),
            meebook: MEEBOOK_API.to_string(),
            systematic: SYSTEMATIC_API.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_origin_strips_trailing_slash() {
        let e = Endpoints::with_origin("http://127.0.0.1:4000/");
        assert_eq!(e.api_base, "http://127.0.0.1:4000/api/v");
        assert_eq!(e.portal_home, "http://127.0.0.1:4000/portal/");
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let e: Endpoints = serde_json::from_str(r#"{"meebook":"http://x"}"#).unwrap();
        assert_eq!(e.meebook, "http://x");
        assert_eq!(e.api_base, API_BASE);
    }
}
