//! The portal's JSON response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status part of the envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiStatus {
    /// Portal status code; mirrors HTTP codes such as 403.
    pub code: i64,
    /// Portal status message, `"OK"` on success.
    pub message: String,
}

/// `{"status": {...}, "data": ...}` as returned by every portal method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEnvelope {
    /// Status block.
    pub status: ApiStatus,
    /// Method payload.
    pub data: Value,
}

impl ApiEnvelope {
    /// Returns true when the status message is `OK`.
    pub fn is_ok(&self) -> bool {
        self.status.message == "OK"
    }

    /// Returns true when the portal refused access to this item.
    pub fn is_forbidden(&self) -> bool {
        self.status.code == 403
    }

    /// Looks up a JSON pointer inside `data`.
    pub fn data_at(&self, pointer: &str) -> Option<&Value> {
        self.data.pointer(pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_and_forbidden() {
        let env: ApiEnvelope = serde_json::from_value(json!({
            "status": {"code": 0, "message": "OK"},
            "data": {"threads": []}
        }))
        .unwrap();
        assert!(env.is_ok());
        assert!(!env.is_forbidden());
        assert!(env.data_at("/threads").is_some());

        let env: ApiEnvelope =
            serde_json::from_value(json!({"status": {"code": 403, "message": "x"}})).unwrap();
        assert!(env.is_forbidden());
        assert!(env.data.is_null());
    }
}
