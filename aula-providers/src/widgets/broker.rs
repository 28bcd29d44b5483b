//! Widget discovery and token minting.

use std::collections::{BTreeMap, HashMap};

use aula_fetch::PortalSession;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::ids;
use crate::error::WidgetError;
use crate::portal::{fetch_widget_config, methods};

/// Widgets enabled for the account and the last token minted for each.
///
/// Tokens are not expiry-aware; a new one is minted on every request and
/// remembered for diagnostics only.
#[derive(Debug, Clone, Default)]
pub struct WidgetBroker {
    widgets: BTreeMap<String, String>,
    tokens: HashMap<String, String>,
}

impl WidgetBroker {
    /// Creates a broker with nothing discovered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Widget id to name from a profile context `data` object.
    pub fn parse_widgets(data: &Value) -> BTreeMap<String, String> {
        data.pointer("/moduleWidgetConfiguration/widgetConfigurations")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|config| {
                let widget = config.get("widget")?;
                let id = widget.get("widgetId")?.as_str()?;
                let name = widget.get("name").and_then(Value::as_str).unwrap_or_default();
                Some((id.to_string(), name.to_string()))
            })
            .collect()
    }

    /// Loads the enabled widgets, replacing any earlier result.
    ///
    /// # Errors
    ///
    /// Returns an error when the profile context cannot be loaded.
    #[instrument(skip(self, session))]
    pub async fn discover(&mut self, session: &PortalSession) -> Result<&BTreeMap<String, String>, WidgetError> {
        let data = fetch_widget_config(session).await?;
        self.widgets = Self::parse_widgets(&data);
        info!(widgets = ?self.widgets.keys().collect::<Vec<_>>(), "Widgets discovered");
        self.log_coverage();
        Ok(&self.widgets)
    }

    /// Replaces the widget map.
    pub fn set_widgets(&mut self, widgets: BTreeMap<String, String>) {
        self.widgets = widgets;
    }

    /// Mints a token for an enabled widget.
    ///
    /// Returns the `Authorization` header value, `Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::NotAvailable`] for a widget that was not
    /// discovered, [`WidgetError::NoToken`] when the portal returns no token.
    #[instrument(skip(self, session))]
    pub async fn token(&mut self, session: &PortalSession, widget_id: &str) -> Result<String, WidgetError> {
        if !self.has(widget_id) {
            return Err(WidgetError::NotAvailable(widget_id.to_string()));
        }

        let query = format!("{}{widget_id}", methods::WIDGET_TOKEN);
        let url = session.api().method_url(&query);
        let envelope = session
            .api_get(&query)
            .await?
            .ensure_success(&url)?
            .envelope()?;
        let raw = envelope
            .data
            .as_str()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WidgetError::NoToken(widget_id.to_string()))?;

        let token = format!("Bearer {raw}");
        self.tokens.insert(widget_id.to_string(), token.clone());
        debug!("Widget token minted");
        Ok(token)
    }

    /// Returns true when the widget is enabled.
    pub fn has(&self, widget_id: &str) -> bool {
        self.widgets.contains_key(widget_id)
    }

    /// Returns true once discovery found at least one widget.
    pub fn is_discovered(&self) -> bool {
        !self.widgets.is_empty()
    }

    /// Enabled widgets, id to name.
    pub fn widgets(&self) -> &BTreeMap<String, String> {
        &self.widgets
    }

    /// Most recent token for a widget.
    pub fn last_token(&self, widget_id: &str) -> Option<&str> {
        self.tokens.get(widget_id).map(String::as_str)
    }

    fn log_coverage(&self) {
        let weekly = [ids::WEEKLY_LETTER, ids::MEEBOOK, ids::REMINDERS, ids::TASK_LIST];
        if !weekly.iter().any(|id| self.has(id)) {
            warn!("Weekly plans are enabled, but no weekly plan widgets (0029, 0004, 0062, 0030) were found");
        }
        if self.has(ids::WEEKLY_LETTER) && self.has(ids::MEEBOOK) {
            warn!("Both 0029 and 0004 write weekly letters; combining them is untested");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_widgets() {
        let data = json!({
            "moduleWidgetConfiguration": {
                "widgetConfigurations": [
                    {"widget": {"widgetId": "0030", "name": "Opgaveliste"}},
                    {"widget": {"widgetId": "0062", "name": "Huskelisten"}},
                    {"widget": {"name": "no id"}},
                    {"placement": "right"}
                ]
            }
        });
        let widgets = WidgetBroker::parse_widgets(&data);
        assert_eq!(widgets.len(), 2);
        assert_eq!(widgets["0030"], "Opgaveliste");
        assert_eq!(widgets["0062"], "Huskelisten");
    }

    #[test]
    fn test_parse_widgets_without_configuration() {
        assert!(WidgetBroker::parse_widgets(&json!({})).is_empty());
    }

    #[test]
    fn test_set_widgets_replaces() {
        let mut broker = WidgetBroker::new();
        assert!(!broker.is_discovered());
        broker.set_widgets(BTreeMap::from([("0029".to_string(), "Ugebrev".to_string())]));
        assert!(broker.has("0029"));
        broker.set_widgets(BTreeMap::from([("0004".to_string(), "Meebook".to_string())]));
        assert!(!broker.has("0029"));
        assert!(broker.has("0004"));
        assert!(broker.last_token("0004").is_none());
    }
}
