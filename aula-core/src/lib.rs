// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Aula Core
//!
//! Core types and models for the Aula client.
//!
//! This crate holds the snapshot that a refresh cycle produces and that
//! collaborators (sensors, calendars, the CLI) read once the cycle is done:
//!
//! - Institution and child context
//! - Presence records and the status label table
//! - Unread message digest
//! - Weekly plans, weekly letters and reminders
//! - Lesson events parsed from the persisted calendar response
//!
//! ## Key Types
//!
//! ### Context
//! - [`InstitutionContext`] - Institutions and the children they own
//! - [`Child`] - A child as listed by the guardian's profile context
//!
//! ### Per-cycle data
//! - [`Presence`] / [`PresenceRecord`] / [`PresenceStatus`] - Daily overview
//! - [`MessageDigest`] / [`MessageSummary`] - Unread messages, capped
//! - [`WeekTasks`] / [`TaskEntry`] / [`WeekPair`] - Weekly plan buckets
//! - [`LessonEvent`] - Calendar lessons
//! - [`AulaSnapshot`] - Everything above in one owned aggregate

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Context
    first_name,
    Child,
    Institution,
    InstitutionContext,
    // Presence
    Presence,
    PresenceRecord,
    PresenceStatus,
    // Messages
    MessageDigest,
    MessageSummary,
    MAX_UNREAD_MESSAGES,
    // Weekly plans
    TaskEntry,
    WeekLabel,
    WeekPair,
    WeekSlot,
    WeekTasks,
    Weekday,
    // Calendar
    parse_lessons,
    LessonEvent,
    // Snapshot
    AulaSnapshot,
};
