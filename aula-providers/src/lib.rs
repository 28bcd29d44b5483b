// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Aula Providers
//!
//! Login flow, pipeline stages and the refresh driver for the Aula client.
//!
//! - **Auth**: UNI-login form chase and API version discovery
//! - **Portal**: stages served by the portal API (profile, presence,
//!   messages, calendar) plus the passthrough call
//! - **Widgets**: token broker and the weekly-plan and reminder back-ends
//! - **Client**: [`AulaClient`], which runs one refresh cycle at a time
//!
//! ## Usage
//!
//! ```ignore
//! use aula_providers::{AulaClient, ClientConfig, Credentials};
//!
//! let mut client = AulaClient::new(
//!     Credentials::new("anna0001", password),
//!     ClientConfig::default(),
//! )?;
//! let snapshot = client.refresh().await?;
//! println!("{} unread", snapshot.messages.count());
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod portal;
pub mod widgets;

pub use auth::{Authenticator, Credentials, LoginOutcome};
pub use client::{AulaClient, ClientConfig, SharedClient};
pub use error::{AuthError, ClientError, ProviderError, WidgetError, ACCESS_DENIED_MESSAGE};
pub use widgets::{WeeklySource, WeeklyUpdate, WidgetBroker, WidgetRequest};
