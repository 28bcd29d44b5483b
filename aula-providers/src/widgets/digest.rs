//! HTML-ish digests shown as sensor attributes.

use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

/// A number followed by a full stop, which renders as a numbered list.
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)(\.)").expect("Invalid regex"));

/// Subject pill Meebook uses for tasks without a subject.
pub const NO_SUBJECT_PILL: &str = "Ingen fag tilknyttet";

/// Marker for a weekly-plan day without tasks.
pub const EMPTY_DAY: &str = "-";

/// Escapes `1.` as `1\.` so markdown renderers keep it as text.
pub fn escape_numbered(text: &str) -> Cow<'_, str> {
    NUMBERED_RE.replace_all(text, r"${1}\.")
}

/// Text stored for a child with no reminders.
pub fn no_reminders(name: &str) -> String {
    format!("{name} har ingen påmindelser.")
}

/// Heading for one reminder, e.g. `Tuesday 29. November`.
pub fn reminder_heading(due: NaiveDateTime) -> String {
    due.format("%A %d. %B").to_string()
}

/// Incremental digest builder.
#[derive(Debug, Default)]
pub struct Digest {
    html: String,
}

impl Digest {
    /// Creates an empty digest.
    pub fn new() -> Self {
        Self::default()
    }

    /// `<h3>heading</h3>`
    pub fn heading(&mut self, text: &str) -> &mut Self {
        self.html.push_str("<h3>");
        self.html.push_str(text);
        self.html.push_str("</h3>");
        self
    }

    /// `<b>text</b><br>`
    pub fn bold_line(&mut self, text: &str) -> &mut Self {
        self.html.push_str("<b>");
        self.html.push_str(text);
        self.html.push_str("</b><br>");
        self
    }

    /// Text followed by a blank line.
    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.html.push_str(text);
        self.html.push_str("<br><br>");
        self
    }

    /// Raw text.
    pub fn text(&mut self, text: &str) -> &mut Self {
        self.html.push_str(text);
        self
    }

    /// Returns true when nothing was written.
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }

    /// The finished markup.
    pub fn finish(self) -> String {
        self.html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_escape_numbered() {
        assert_eq!(escape_numbered("1. lektion"), r"1\. lektion");
        assert_eq!(escape_numbered("3.-5. lektion"), r"3\.-5\. lektion");
        assert_eq!(escape_numbered("kap.1 fra bogen"), "kap.1 fra bogen");
    }

    #[test]
    fn test_reminder_heading() {
        let due = NaiveDate::from_ymd_opt(2022, 11, 29)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        assert_eq!(reminder_heading(due), "Tuesday 29. November");
    }

    #[test]
    fn test_builder() {
        let mut digest = Digest::new();
        digest.heading("mandag").bold_line("Dansk").paragraph("Peter");
        assert_eq!(digest.finish(), "<h3>mandag</h3><b>Dansk</b><br>Peter<br><br>");
    }

    #[test]
    fn test_no_reminders() {
        assert_eq!(no_reminders("Vega"), "Vega har ingen påmindelser.");
    }
}
