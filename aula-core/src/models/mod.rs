//! Domain models for the Aula client.
//!
//! ## Submodules
//!
//! - [`institution`] - Institutions, children and derived lookup maps
//! - [`presence`] - Presence status table and daily overview records
//! - [`message`] - Unread message digest
//! - [`weekly`] - Weekly plan buckets, week labels, reminders
//! - [`lesson`] - Lessons parsed from the calendar response
//! - [`snapshot`] - The aggregate a refresh cycle populates

mod de;
pub mod institution;
pub mod lesson;
pub mod message;
pub mod presence;
pub mod snapshot;
pub mod weekly;

// Re-export everything at the models level
pub use institution::{first_name, Child, Institution, InstitutionContext};
pub use lesson::{parse_lessons, LessonEvent};
pub use message::{MessageDigest, MessageSummary, MAX_UNREAD_MESSAGES};
pub use presence::{Presence, PresenceRecord, PresenceStatus};
pub use snapshot::AulaSnapshot;
pub use weekly::{TaskEntry, WeekLabel, WeekPair, WeekSlot, WeekTasks, Weekday};
