//! Audit records handed to the persistence layer.

use serde::{Deserialize, Serialize};

/// Event names recorded by the intake flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    /// A message matched a crisis phrase and routing was skipped
    CrisisOverride,
    /// The responder produced the reply
    LlmCalled,
    /// The responder failed and the fallback reply was used
    ResponderFallback,
    /// A routing decision was computed
    Routing,
}

/// One event plus its JSON detail. Never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event: AuditEvent,
    pub detail: serde_json::Value,
}

impl AuditRecord {
    pub fn new(event: AuditEvent, detail: serde_json::Value) -> Self {
        Self { event, detail }
    }

    /// Serialize `detail`, recording the serialization error instead if any.
    pub fn from_serializable<T: Serialize>(event: AuditEvent, detail: &T) -> Self {
        let detail = serde_json::to_value(detail)
            .unwrap_or_else(|e| serde_json::json!({ "serialization_error": e.to_string() }));
        Self { event, detail }
    }
}
