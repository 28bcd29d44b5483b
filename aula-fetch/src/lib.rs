// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Aula Fetch
//!
//! HTTP plumbing for the Aula client.
//!
//! ## Session
//!
//! - [`session::PortalSession`] - One cookie-bearing session against the
//!   identity broker and the portal API, with CSRF header handling
//! - [`envelope::ApiEnvelope`] - The portal's `{status, data}` response shape
//!
//! ## Scraping
//!
//! - [`form::HtmlForm`] - First-form extraction for the SSO redirect chain
//!
//! ## Widgets
//!
//! - [`widget::WidgetHttp`] - Cookie-less client for widget provider back-ends,
//!   with a bounded per-request timeout
//!
//! ## Configuration
//!
//! - [`endpoints::Endpoints`] - Every upstream base URL in one place

pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod form;
pub mod session;
pub mod widget;

// Errors
pub use error::{FetchError, HttpError};

// Session
pub use endpoints::Endpoints;
pub use envelope::{ApiEnvelope, ApiStatus};
pub use form::HtmlForm;
pub use session::{ApiLocation, ApiResponse, Page, PortalSession};
pub use widget::{WidgetAuth, WidgetHttp};
