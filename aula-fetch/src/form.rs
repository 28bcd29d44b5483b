//! Minimal HTML form extraction for the SSO redirect chain.
//!
//! The broker pages are plain server-rendered forms (SAML posts, IdP
//! selection, credentials). Only the first form's `action` and every
//! `<input>` carrying both `name` and `value` matter, so a few regexes do.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::FetchError;

// ============================================================================
// Regex Patterns
// ============================================================================

/// Opening tag of a form.
static FORM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<form\b([^>]*)>").expect("Invalid regex"));

/// An input tag.
static INPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<input\b([^>]*)>").expect("Invalid regex"));

/// A quoted attribute inside a tag.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("Invalid regex")
});

// ============================================================================
// HTML Form
// ============================================================================

/// The first form on a page plus every named input with a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlForm {
    /// Raw `action` attribute, entity-decoded.
    pub action: String,
    /// `(name, value)` pairs in document order.
    pub fields: Vec<(String, String)>,
}

impl HtmlForm {
    /// Extracts the first form of a page.
    ///
    /// Returns `None` when the page has no form or the form has no action.
    pub fn first_in(html: &str) -> Option<Self> {
        let form_attrs = FORM_RE.captures(html)?.get(1)?.as_str();
        let action = attribute(form_attrs, "action")?;

        let fields = INPUT_RE
            .captures_iter(html)
            .filter_map(|cap| {
                let attrs = cap.get(1)?.as_str();
                Some((attribute(attrs, "name")?, attribute(attrs, "value")?))
            })
            .collect();

        Some(Self { action, fields })
    }

    /// Like [`HtmlForm::first_in`] but fails with [`FetchError::MissingForm`].
    ///
    /// # Errors
    ///
    /// Returns an error when the page has no usable form.
    pub fn require(html: &str, page_url: &Url) -> Result<Self, FetchError> {
        Self::first_in(html).ok_or_else(|| FetchError::MissingForm(page_url.to_string()))
    }

    /// Replaces values of fields that are already present.
    ///
    /// Names the form does not carry are not added.
    pub fn fill(&mut self, overrides: &[(&str, &str)]) {
        for (name, value) in &mut self.fields {
            if let Some((_, v)) = overrides.iter().find(|(k, _)| *k == name.as_str()) {
                *value = (*v).to_string();
            }
        }
    }

    /// Resolves the action against the URL of the page it came from.
    ///
    /// # Errors
    ///
    /// Returns an error if the action cannot form a valid URL.
    pub fn target(&self, page_url: &Url) -> Result<Url, FetchError> {
        Ok(page_url.join(&self.action)?)
    }

    /// Value of a field by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn attribute(attrs: &str, wanted: &str) -> Option<String> {
    ATTR_RE.captures_iter(attrs).find_map(|cap| {
        let name = cap.get(1)?.as_str();
        if !name.eq_ignore_ascii_case(wanted) {
            return None;
        }
        let value = cap.get(2).or_else(|| cap.get(3))?.as_str();
        Some(decode_entities(value))
    })
}

/// Decodes the handful of entities that appear in attribute values.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#x2F;", "/")
        .replace("&#x3D;", "=")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAML_PAGE: &str = r#"
        <html><body onload="document.forms[0].submit()">
        <form method="post" action="https://broker.unilogin.dk/auth/realms/broker/endpoint?a=1&amp;b=2">
            <input type="hidden" name="SAMLResponse" value="PHNhbWw+" />
            <input type="hidden" name="RelayState" value='xyz' />
            <input type="submit" value="Continue" />
        </form>
        <form action="/other"></form>
        </body></html>
    "#;

    #[test]
    fn test_first_form_action_and_fields() {
        let form = HtmlForm::first_in(SAML_PAGE).unwrap();
        assert_eq!(
            form.action,
            "https://broker.unilogin.dk/auth/realms/broker/endpoint?a=1&b=2"
        );
        assert_eq!(form.field("SAMLResponse"), Some("PHNhbWw+"));
        assert_eq!(form.field("RelayState"), Some("xyz"));
        // the submit button has a value but no name
        assert_eq!(form.fields.len(), 2);
    }

    #[test]
    fn test_fill_only_overrides_present_fields() {
        let html = r#"<form action="/login"><input name="username" value="">
            <input name="password" value=""><input name="csrf" value="t1"></form>"#;
        let mut form = HtmlForm::first_in(html).unwrap();
        form.fill(&[
            ("username", "anna"),
            ("password", "hemmelig"),
            ("selected-aktoer", "KONTAKT"),
        ]);
        assert_eq!(form.field("username"), Some("anna"));
        assert_eq!(form.field("password"), Some("hemmelig"));
        assert_eq!(form.field("csrf"), Some("t1"));
        assert!(form.field("selected-aktoer").is_none());
    }

    #[test]
    fn test_inputs_without_value_are_skipped() {
        let html = r#"<form action="/x"><input name="username"></form>"#;
        let form = HtmlForm::first_in(html).unwrap();
        assert!(form.fields.is_empty());
    }

    #[test]
    fn test_relative_action_resolves_against_page() {
        let html = r#"<FORM ACTION="/auth/step2" METHOD="POST"></FORM>"#;
        let form = HtmlForm::first_in(html).unwrap();
        let page = Url::parse("https://login.aula.dk/auth/login.php?type=unilogin").unwrap();
        assert_eq!(
            form.target(&page).unwrap().as_str(),
            "https://login.aula.dk/auth/step2"
        );
    }

    #[test]
    fn test_page_without_form() {
        assert!(HtmlForm::first_in("<html><p>Nope</p></html>").is_none());
        let url = Url::parse("https://x.dk/").unwrap();
        assert!(matches!(
            HtmlForm::require("<p/>", &url),
            Err(FetchError::MissingForm(_))
        ));
    }
}
