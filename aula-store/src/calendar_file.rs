//! The calendar side file.
//!
//! The refresh cycle writes the raw calendar response; the calendar reader
//! parses it later on its own schedule. The file holds a JSON string whose
//! content is the response body, so it is JSON-encoded twice. Both sides go
//! through this type so the format stays in one place.

use std::path::{Path, PathBuf};

use aula_core::{LessonEvent, parse_lessons};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::persistence::save_text;

/// Handle to the calendar side file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarFile {
    path: PathBuf,
}

impl CalendarFile {
    /// Binds to a path. Nothing is read or written yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes a raw response body, double-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[instrument(skip(self, body), fields(path = %self.path.display()))]
    pub async fn write_raw(&self, body: &str) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(body)?;
        save_text(&self.path, &encoded).await?;
        debug!(bytes = body.len(), "Calendar file written");
        Ok(())
    }

    /// Reads back the raw response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or is not a JSON string.
    pub async fn read_raw(&self) -> Result<String, StoreError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str::<String>(&content)?)
    }

    /// Reads and decodes the stored response.
    ///
    /// # Errors
    ///
    /// Returns an error if either encoding layer does not parse.
    pub async fn read_response(&self) -> Result<Value, StoreError> {
        let raw = self.read_raw().await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Lessons for one child from the stored response.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has no event list.
    pub async fn lessons_for(&self, child_id: &str) -> Result<Vec<LessonEvent>, StoreError> {
        let response = self.read_response().await?;
        Ok(parse_lessons(&response, child_id)?)
    }
}
