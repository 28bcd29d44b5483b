//! Presence status table and daily overview records.
//!
//! The attendance module reports a small integer status per child. Only a few
//! codes are meaningful; the rest are reserved and shown as their number.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Label reported for a child the presence module does not track.
pub const UNTRACKED_LABEL: &str = "n/a";

/// Exit time upstream uses when no exit has been planned.
const EXIT_TIME_UNSET: &str = "23:59:00";

/// Daily overview fields surfaced as presence attributes, in display order.
pub const PRESENCE_FIELDS: [&str; 12] = [
    "location",
    "sleepIntervals",
    "checkInTime",
    "checkOutTime",
    "activityType",
    "entryTime",
    "exitTime",
    "exitWith",
    "comment",
    "spareTimeActivity",
    "selfDeciderStartTime",
    "selfDeciderEndTime",
];

// ============================================================================
// Presence Status
// ============================================================================

/// Presence status code from the attendance module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum PresenceStatus {
    /// 0: not arrived yet.
    NotArrived,
    /// 1: reported sick.
    Sick,
    /// 2: vacation or day off.
    Vacation,
    /// 3: arrived and present.
    Present,
    /// 4: on a field trip.
    FieldTrip,
    /// 5: sleeping.
    Sleeping,
    /// 8: picked up or gone home.
    Left,
    /// Any reserved or unknown code.
    Other(i64),
}

impl PresenceStatus {
    /// Maps a raw status code. Never fails.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::NotArrived,
            1 => Self::Sick,
            2 => Self::Vacation,
            3 => Self::Present,
            4 => Self::FieldTrip,
            5 => Self::Sleeping,
            8 => Self::Left,
            other => Self::Other(other),
        }
    }

    /// Returns the raw status code.
    pub fn code(self) -> i64 {
        match self {
            Self::NotArrived => 0,
            Self::Sick => 1,
            Self::Vacation => 2,
            Self::Present => 3,
            Self::FieldTrip => 4,
            Self::Sleeping => 5,
            Self::Left => 8,
            Self::Other(code) => code,
        }
    }

    /// Danish display label.
    pub fn label(self) -> String {
        match self {
            Self::NotArrived => "Ikke kommet".to_string(),
            Self::Sick => "Syg".to_string(),
            Self::Vacation => "Ferie/Fri".to_string(),
            Self::Present => "Kommet/Til stede".to_string(),
            Self::FieldTrip => "På tur".to_string(),
            Self::Sleeping => "Sover".to_string(),
            Self::Left => "Gået".to_string(),
            Self::Other(code) => code.to_string(),
        }
    }
}

impl From<i64> for PresenceStatus {
    fn from(code: i64) -> Self {
        Self::from_code(code)
    }
}

impl From<PresenceStatus> for i64 {
    fn from(status: PresenceStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// ============================================================================
// Presence Record
// ============================================================================

/// First daily overview record for a child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    /// Presence status.
    pub status: PresenceStatus,
    /// Profile picture URL, when upstream includes one.
    pub profile_picture: Option<String>,
    /// Raw overview fields from [`PRESENCE_FIELDS`]; missing ones are `null`.
    pub fields: BTreeMap<String, Value>,
}

impl PresenceRecord {
    /// Builds a record from one daily overview entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry has no integer `status`.
    pub fn from_overview(entry: &Value) -> Result<Self, CoreError> {
        let status = entry
            .get("status")
            .and_then(Value::as_i64)
            .ok_or_else(|| CoreError::MissingField("status".to_string()))?;

        let profile_picture = entry
            .pointer("/institutionProfile/profilePicture/url")
            .and_then(Value::as_str)
            .map(ToString::to_string);

        let fields = PRESENCE_FIELDS
            .iter()
            .map(|name| {
                let value = entry.get(*name).cloned().unwrap_or(Value::Null);
                ((*name).to_string(), value)
            })
            .collect();

        Ok(Self {
            status: PresenceStatus::from_code(status),
            profile_picture,
            fields,
        })
    }

    /// Attributes for display, with the time policy applied.
    ///
    /// `HH:MM:SS` values become `HH:MM`, an unset exit time becomes `null`,
    /// and everything else passes through. `profilePicture` is appended.
    pub fn attributes(&self) -> BTreeMap<String, Value> {
        let mut attrs: BTreeMap<String, Value> = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), display_value(name, value)))
            .collect();
        attrs.insert(
            "profilePicture".to_string(),
            self.profile_picture
                .clone()
                .map_or(Value::Null, Value::String),
        );
        attrs
    }
}

fn display_value(name: &str, value: &Value) -> Value {
    let Some(text) = value.as_str() else {
        return value.clone();
    };
    if name == "exitTime" && text == EXIT_TIME_UNSET {
        return Value::Null;
    }
    shorten_time(text).map_or_else(|| value.clone(), Value::String)
}

/// Shortens `HH:MM:SS` to `HH:MM`. Anything else yields `None`.
pub fn shorten_time(text: &str) -> Option<String> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .ok()
        .map(|t| t.format("%H:%M").to_string())
}

// ============================================================================
// Presence
// ============================================================================

/// Presence for one child in the current cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "record", rename_all = "snake_case")]
pub enum Presence {
    /// Upstream returned no overview for the child.
    Untracked,
    /// Upstream returned at least one overview; the first is kept.
    Tracked(PresenceRecord),
}

impl Presence {
    /// Returns true when the presence module tracks this child.
    pub fn is_tracked(&self) -> bool {
        matches!(self, Self::Tracked(_))
    }

    /// Display label, or `n/a` for an untracked child.
    pub fn label(&self) -> String {
        match self {
            Self::Untracked => UNTRACKED_LABEL.to_string(),
            Self::Tracked(record) => record.status.label(),
        }
    }

    /// The record, if tracked.
    pub fn record(&self) -> Option<&PresenceRecord> {
        match self {
            Self::Untracked => None,
            Self::Tracked(record) => Some(record),
        }
    }
}
