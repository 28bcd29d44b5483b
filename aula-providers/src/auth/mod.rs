//! Authenticator: SSO form chase plus API version discovery.
//!
//! # Flow
//!
//! 1. Load the broker's login entry page and submit its first form with the
//!    UNI-login identity provider selected.
//! 2. Follow up to [`MAX_LOGIN_REDIRECTS`] form pages, merging the
//!    credentials into each form's own fields, until the portal home loads.
//! 3. Probe `profiles.getProfilesByLogin` from the configured API version
//!    upwards until one is not retired.
//! 4. Load the guardian profile context.

mod credentials;
mod login;
mod version;

pub use credentials::Credentials;
pub use login::{is_portal_home, Authenticator, LoginOutcome, IDP_SELECTOR, MAX_LOGIN_REDIRECTS};
pub use version::discover_api_version;
