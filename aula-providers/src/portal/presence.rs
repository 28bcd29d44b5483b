//! Daily presence overview per child.

use std::collections::HashMap;

use aula_core::{InstitutionContext, Presence, PresenceRecord};
use aula_fetch::PortalSession;
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::methods;
use crate::error::ProviderError;

/// Fetches presence for one child.
///
/// An empty overview list means the child is not tracked by the presence
/// module; only the first entry is kept otherwise.
///
/// # Errors
///
/// Returns an error on transport failure or when the response has no
/// `data` list or its first entry has no status.
#[instrument(skip(session))]
pub async fn fetch_presence(session: &PortalSession, child_id: &str) -> Result<Presence, ProviderError> {
    let query = format!("{}{child_id}", methods::DAILY_OVERVIEW);
    let envelope = session.api_get(&query).await?.envelope()?;
    presence_from_overview(&envelope.data, child_id)
}

fn presence_from_overview(data: &Value, child_id: &str) -> Result<Presence, ProviderError> {
    let entries = data
        .as_array()
        .ok_or_else(|| ProviderError::InvalidResponse("presence data is not a list".to_string()))?;

    match entries.first() {
        Some(first) => Ok(Presence::Tracked(PresenceRecord::from_overview(first)?)),
        None => {
            debug!(child_id, "No presence data for child, some attributes will be missing");
            Ok(Presence::Untracked)
        }
    }
}

/// Fetches presence for every child in the context.
///
/// Children are queried concurrently. A child whose fetch fails is logged
/// and left out of the map.
pub async fn fetch_all_presence(
    session: &PortalSession,
    context: &InstitutionContext,
) -> HashMap<String, Presence> {
    let ids = context.child_ids();
    let results = join_all(ids.iter().map(|id| fetch_presence(session, id))).await;

    let mut presence = HashMap::new();
    for (id, result) in ids.into_iter().zip(results) {
        match result {
            Ok(p) => {
                presence.insert(id, p);
            }
            Err(e) => warn!(child_id = %id, error = %e, "Presence fetch failed"),
        }
    }
    debug!(
        tracked = presence.values().filter(|p| p.is_tracked()).count(),
        total = presence.len(),
        "Presence updated"
    );
    presence
}
