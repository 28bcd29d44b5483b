//! Calendar command - lessons from the calendar side file.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use aula_core::{parse_lessons, InstitutionContext, LessonEvent};
use aula_store::{CalendarFile, SettingsStore};
use clap::Args;
use serde_json::Value;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the calendar command.
#[derive(Args)]
pub struct CalendarArgs {
    /// Child id to show. Repeat for several; defaults to every child in the file.
    #[arg(long, short)]
    pub child: Vec<String>,

    /// Refresh with the school schedule enabled before reading the file.
    #[arg(long)]
    pub refresh: bool,
}

/// Runs the calendar command.
pub async fn run(args: &CalendarArgs, settings: &SettingsStore, cli: &Cli) -> Result<()> {
    let mut settings = settings.get().await;

    let context = if args.refresh {
        settings.school_schedule = true;
        let mut client = super::build_client(&settings)?;
        Some(client.refresh().await?.context.clone())
    } else {
        None
    };

    let file = CalendarFile::new(settings.calendar_path());
    let response = file.read_response().await.with_context(|| {
        format!(
            "Cannot read calendar file {}. Enable school_schedule and refresh first",
            file.path().display()
        )
    })?;

    let children = if args.child.is_empty() {
        lesson_owners(&response)
    } else {
        args.child.clone()
    };

    let mut lessons: BTreeMap<String, Vec<LessonEvent>> = BTreeMap::new();
    for child_id in children {
        let events = parse_lessons(&response, &child_id)?;
        lessons.insert(child_label(context.as_ref(), &child_id), events);
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_lessons(&lessons));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_lessons(&lessons)?);
        }
    }

    Ok(())
}

/// Child ids that own at least one lesson, in first-seen order.
fn lesson_owners(response: &Value) -> Vec<String> {
    let mut owners: Vec<String> = Vec::new();
    let events = response.get("data").and_then(Value::as_array);
    for event in events.into_iter().flatten() {
        if event.get("type").and_then(Value::as_str) != Some("lesson") {
            continue;
        }
        let id = match event.pointer("/belongsToProfiles/0") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.clone(),
            _ => continue,
        };
        if !owners.contains(&id) {
            owners.push(id);
        }
    }
    owners
}

fn child_label(context: Option<&InstitutionContext>, child_id: &str) -> String {
    context
        .and_then(|ctx| ctx.display_name(child_id))
        .unwrap_or_else(|| format!("Child {child_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lesson_owners_in_order() {
        let response = json!({
            "data": [
                {"type": "lesson", "belongsToProfiles": [102]},
                {"type": "event", "belongsToProfiles": [103]},
                {"type": "lesson", "belongsToProfiles": ["101"]},
                {"type": "lesson", "belongsToProfiles": [102]},
                {"type": "lesson", "belongsToProfiles": []}
            ]
        });
        assert_eq!(lesson_owners(&response), vec!["102", "101"]);
    }

    #[test]
    fn test_lesson_owners_without_data() {
        assert!(lesson_owners(&json!({"status": {"code": 0}})).is_empty());
    }

    #[test]
    fn test_child_label_falls_back_to_id() {
        assert_eq!(child_label(None, "101"), "Child 101");
    }
}
