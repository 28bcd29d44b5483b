//! Unread message threads.

use aula_core::models::message::{EMPTY_TEXT, UNKNOWN_SENDER};
use aula_core::{MessageDigest, MessageSummary};
use aula_fetch::PortalSession;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::methods;
use crate::error::ProviderError;

/// Message types that count as unread content.
const COUNTED_TYPES: [&str; 2] = ["Message", "MessageEdited"];

/// Ids of threads whose `read` flag is explicitly false, newest first.
///
/// # Errors
///
/// Returns an error when `threads` is missing.
pub fn unread_thread_ids(data: &Value) -> Result<Vec<String>, ProviderError> {
    let threads = data
        .get("threads")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::InvalidResponse("thread list has no threads".to_string()))?;

    Ok(threads
        .iter()
        .filter(|t| t.get("read").and_then(Value::as_bool) == Some(false))
        .filter_map(|t| match t.get("id") {
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        })
        .collect())
}

/// Summaries for the countable messages in one thread's detail `data`.
pub fn parse_thread(data: &Value) -> Vec<MessageSummary> {
    let subject = data
        .get("subject")
        .and_then(Value::as_str)
        .unwrap_or_default();

    data.get("messages")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter(|m| {
            m.get("messageType")
                .and_then(Value::as_str)
                .is_some_and(|t| COUNTED_TYPES.contains(&t))
        })
        .map(|m| MessageSummary {
            text: message_text(m),
            sender: m
                .pointer("/sender/fullName")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_SENDER)
                .to_string(),
            subject: subject.to_string(),
        })
        .collect()
}

fn message_text(message: &Value) -> String {
    if let Some(html) = message.pointer("/text/html").and_then(Value::as_str) {
        return html.to_string();
    }
    if let Some(text) = message.get("text").and_then(Value::as_str) {
        return text.to_string();
    }
    warn!("Unread message without readable text");
    EMPTY_TEXT.to_string()
}

/// Collects unread messages, newest thread first.
///
/// Expansion stops as soon as [`aula_core::MAX_UNREAD_MESSAGES`] messages
/// are collected, so the count undercounts once the cap is hit. A thread
/// the session may not read yields one sensitive placeholder. A failing
/// thread is logged and skipped.
///
/// # Errors
///
/// Returns an error only when the thread list itself cannot be loaded.
#[instrument(skip(session))]
pub async fn fetch_unread_messages(session: &PortalSession) -> Result<MessageDigest, ProviderError> {
    let envelope = session.api_get(methods::THREADS).await?.envelope()?;
    let ids = unread_thread_ids(&envelope.data)?;
    debug!(unread_threads = ids.len(), "Thread list loaded");

    let mut digest = MessageDigest::new();
    for id in ids {
        if digest.is_full() {
            debug!("Unread message cap reached");
            break;
        }
        match fetch_thread(session, &id).await {
            Ok(messages) => {
                for message in messages {
                    if !digest.push(message) {
                        break;
                    }
                }
            }
            Err(e) => warn!(thread_id = %id, error = %e, "Thread fetch failed"),
        }
    }
    Ok(digest)
}

async fn fetch_thread(session: &PortalSession, thread_id: &str) -> Result<Vec<MessageSummary>, ProviderError> {
    let response = session.api_get(&methods::thread_messages(thread_id)).await?;
    if response.status == StatusCode::FORBIDDEN {
        debug!(thread_id, "Sensitive thread");
        return Ok(vec![MessageSummary::sensitive()]);
    }

    let envelope = response.envelope()?;
    if envelope.is_forbidden() {
        debug!(thread_id, "Sensitive thread");
        return Ok(vec![MessageSummary::sensitive()]);
    }
    Ok(parse_thread(&envelope.data))
}
