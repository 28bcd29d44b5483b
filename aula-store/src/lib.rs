// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Aula Store
//!
//! State and persistence for the Aula client.
//!
//! This crate provides:
//!
//! - **SnapshotStore**: The latest refresh result with watch-channel
//!   notifications for collaborators
//! - **SettingsStore**: Username, feature flags and tuning, persisted as JSON
//! - **CalendarFile**: The calendar side file shared with the calendar reader
//! - **keychain**: Password lookup (environment, then OS keychain)
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use aula_store::{SettingsStore, SnapshotStore};
//!
//! let settings = SettingsStore::load_default().await?;
//! let store = SnapshotStore::new();
//!
//! let mut rx = store.subscribe();
//! while rx.changed().await.is_ok() {
//!     if let Some(snapshot) = store.get().await {
//!         println!("{} unread", snapshot.messages.count());
//!     }
//! }
//! ```

pub mod calendar_file;
pub mod error;
pub mod keychain;
pub mod persistence;
pub mod settings_store;
pub mod snapshot_store;

pub use calendar_file::CalendarFile;
pub use error::StoreError;
pub use persistence::{
    default_cache_dir, default_calendar_path, default_config_dir, default_settings_path,
    load_json, load_json_or_default, save_json,
};
pub use settings_store::{LogLevel, Settings, SettingsStore};
pub use snapshot_store::SnapshotStore;
