//! Institutions, children and the lookup maps derived from them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::de::{id_string, opt_id_string};

// ============================================================================
// Child
// ============================================================================

/// A child listed under an institution in the guardian's profile context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    /// Institution profile id. Used for presence and calendar queries.
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    /// Full display name.
    pub name: String,
    /// Owning user id. Used for widget child filters.
    #[serde(rename = "userId", deserialize_with = "id_string")]
    pub user_id: String,
}

impl Child {
    /// First whitespace-separated token of the name.
    pub fn first_name(&self) -> &str {
        first_name(&self.name)
    }
}

/// Returns the first whitespace-separated token of a name.
///
/// Widget providers key their output by this token, so every weekly map uses it.
pub fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or("")
}

// ============================================================================
// Institution
// ============================================================================

/// An institution the guardian has children in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    /// Institution display name.
    pub name: String,
    /// Institution code, used by widget institution filters.
    #[serde(rename = "institutionCode", deserialize_with = "id_string")]
    pub code: String,
    /// Children attending this institution.
    #[serde(default)]
    pub children: Vec<Child>,
}

// ============================================================================
// Institution Context
// ============================================================================

/// The guardian's profile context: every institution and its children.
///
/// Rebuilt in full on every refresh. Nothing is merged across cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionContext {
    /// Guardian user id, needed by widget providers.
    #[serde(rename = "userId", default, deserialize_with = "opt_id_string")]
    pub guardian_user_id: Option<String>,
    /// Institutions in upstream order.
    #[serde(default)]
    pub institutions: Vec<Institution>,
}

impl InstitutionContext {
    /// Iterates over `(institution, child)` pairs in upstream order.
    pub fn children(&self) -> impl Iterator<Item = (&Institution, &Child)> {
        self.institutions
            .iter()
            .flat_map(|inst| inst.children.iter().map(move |child| (inst, child)))
    }

    /// Returns true when no children are listed.
    pub fn is_empty(&self) -> bool {
        self.children().next().is_none()
    }

    /// Child ids in upstream order.
    pub fn child_ids(&self) -> Vec<String> {
        self.children().map(|(_, c)| c.id.clone()).collect()
    }

    /// Child user ids in upstream order.
    pub fn child_user_ids(&self) -> Vec<String> {
        self.children().map(|(_, c)| c.user_id.clone()).collect()
    }

    /// Institution codes in upstream order.
    pub fn institution_codes(&self) -> Vec<String> {
        self.institutions.iter().map(|i| i.code.clone()).collect()
    }

    /// Child id to full name.
    pub fn child_names(&self) -> HashMap<String, String> {
        self.children()
            .map(|(_, c)| (c.id.clone(), c.name.clone()))
            .collect()
    }

    /// Child id to institution name.
    pub fn child_institutions(&self) -> HashMap<String, String> {
        self.children()
            .map(|(i, c)| (c.id.clone(), i.name.clone()))
            .collect()
    }

    /// Child id to first name, the key used by weekly-plan maps.
    pub fn first_names(&self) -> HashMap<String, String> {
        self.children()
            .map(|(_, c)| (c.id.clone(), c.first_name().to_string()))
            .collect()
    }

    /// Distinct first names in upstream order.
    pub fn distinct_first_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for (_, child) in self.children() {
            let name = child.first_name();
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Looks up a child by id.
    pub fn child(&self, id: &str) -> Option<&Child> {
        self.children().map(|(_, c)| c).find(|c| c.id == id)
    }

    /// Display name used by sensors: `"<institution> <first name>"`.
    pub fn display_name(&self, child_id: &str) -> Option<String> {
        self.children()
            .find(|(_, c)| c.id == child_id)
            .map(|(i, c)| format!("{} {}", i.name, c.first_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> InstitutionContext {
        serde_json::from_value(json!({
            "userId": 900,
            "institutions": [
                {
                    "name": "Skovskolen",
                    "institutionCode": "280123",
                    "children": [
                        {"id": 101, "name": "Anna Marie Jensen", "userId": 501},
                        {"id": "102", "name": "Bo Jensen", "userId": "502"}
                    ]
                },
                {
                    "name": "Solsikken",
                    "institutionCode": 280999,
                    "children": [
                        {"id": 103, "name": "Anna Sørensen", "userId": 503}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let ctx = sample();
        assert_eq!(ctx.guardian_user_id.as_deref(), Some("900"));
        assert_eq!(ctx.child_ids(), vec!["101", "102", "103"]);
        assert_eq!(ctx.child_user_ids(), vec!["501", "502", "503"]);
        assert_eq!(ctx.institution_codes(), vec!["280123", "280999"]);
    }

    #[test]
    fn test_derived_maps() {
        let ctx = sample();
        assert_eq!(ctx.child_names()["101"], "Anna Marie Jensen");
        assert_eq!(ctx.child_institutions()["103"], "Solsikken");
        assert_eq!(ctx.first_names()["102"], "Bo");
    }

    #[test]
    fn test_distinct_first_names_collapse_collisions() {
        let ctx = sample();
        assert_eq!(ctx.distinct_first_names(), vec!["Anna", "Bo"]);
    }

    #[test]
    fn test_display_name() {
        let ctx = sample();
        assert_eq!(ctx.display_name("101").as_deref(), Some("Skovskolen Anna"));
        assert!(ctx.display_name("999").is_none());
    }

    #[test]
    fn test_first_name_of_empty() {
        assert_eq!(first_name(""), "");
        assert_eq!(first_name("  Bo  Hansen"), "Bo");
    }

    #[test]
    fn test_missing_children_defaults_empty() {
        let ctx: InstitutionContext = serde_json::from_value(json!({
            "institutions": [{"name": "X", "institutionCode": "1"}]
        }))
        .unwrap();
        assert!(ctx.is_empty());
        assert!(ctx.guardian_user_id.is_none());
    }
}
