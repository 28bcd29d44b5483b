//! Pipeline stages served by the portal API itself.
//!
//! Every stage here rides on the authenticated [`aula_fetch::PortalSession`]
//! and its cookies. Widget back-ends live in [`crate::widgets`].

mod calendar;
mod messages;
mod passthrough;
mod presence;
mod profile;

pub use calendar::{calendar_query, fetch_calendar, CALENDAR_WINDOW_DAYS};
pub use messages::{fetch_unread_messages, parse_thread, unread_thread_ids};
pub use passthrough::{api_call, INVALID_POST_DATA};
pub use presence::{fetch_all_presence, fetch_presence};
pub use profile::{fetch_profile_context, fetch_widget_config, is_session_alive};

/// Portal method names and their fixed query parameters.
pub mod methods {
    /// Version probe and liveness check.
    pub const PROFILES_BY_LOGIN: &str = "profiles.getProfilesByLogin";
    /// Guardian profile context (institutions, children, user id).
    pub const PROFILE_CONTEXT_GUARDIAN: &str = "profiles.getProfileContext&portalrole=guardian";
    /// Profile context with the widget configuration.
    pub const PROFILE_CONTEXT: &str = "profiles.getProfileContext";
    /// Widget token; the widget id is appended.
    pub const WIDGET_TOKEN: &str = "aulaToken.getAulaToken&widgetId=";
    /// Presence overview; the child id is appended.
    pub const DAILY_OVERVIEW: &str = "presence.getDailyOverview&childIds[]=";
    /// Newest threads first.
    pub const THREADS: &str = "messaging.getThreads&sortOn=date&orderDirection=desc&page=0";
    /// Calendar events for a set of profiles.
    pub const CALENDAR_EVENTS: &str = "calendar.getEventsByProfileIdsAndResourceIds";

    /// First page of messages in a thread.
    pub fn thread_messages(thread_id: &str) -> String {
        format!("messaging.getMessagesForThread&threadId={thread_id}&page=0")
    }
}
