//! Conversation responder trait and the fixed-response implementation.
//!
//! The responder stands in for a language model. It only runs for messages
//! the crisis detector has already cleared.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::RuntimeConfig;
use crate::RuntimeError;

/// Errors from responders.
#[derive(Error, Debug)]
pub enum ResponderError {
    #[error("Responder call failed: {0}")]
    Failed(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

/// What the caller should do after a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Keep the conversation going
    Continue,
    /// End the conversational flow (crisis)
    Stop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,

    #[serde(default = "empty_object")]
    pub payload: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl NextAction {
    pub fn continue_() -> Self {
        Self {
            kind: ActionKind::Continue,
            payload: empty_object(),
        }
    }

    pub fn stop() -> Self {
        Self {
            kind: ActionKind::Stop,
            payload: empty_object(),
        }
    }
}

/// Structured reply to one intake message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageReply {
    pub intent: String,
    pub user_message: String,

    #[serde(default = "empty_object")]
    pub extracted_entities: serde_json::Value,

    pub next_action: NextAction,
}

/// Produces replies for non-crisis messages.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Name used in logs and audit records.
    fn name(&self) -> &str;

    async fn generate(&self, message: &str) -> Result<MessageReply, ResponderError>;
}

const SUMMARY_MESSAGE: &str =
    "Thank you for sharing. Here is a brief neutral summary of what you mentioned.";

/// Returns the same neutral summary for every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockResponder;

#[async_trait]
impl Responder for MockResponder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _message: &str) -> Result<MessageReply, ResponderError> {
        Ok(MessageReply {
            intent: "summary".to_string(),
            user_message: SUMMARY_MESSAGE.to_string(),
            extracted_entities: empty_object(),
            next_action: NextAction::continue_(),
        })
    }
}

/// Pick the responder the configuration asks for.
///
/// Only the fixed-response responder exists; anything else is a
/// configuration error.
pub fn responder_from_config(config: &RuntimeConfig) -> Result<Arc<dyn Responder>, RuntimeError> {
    if config.mock_responder {
        Ok(Arc::new(MockResponder))
    } else {
        Err(RuntimeError::ResponderNotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_reply_shape() {
        let reply = MockResponder.generate("hello").await.unwrap();
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "intent": "summary",
                "user_message": SUMMARY_MESSAGE,
                "extracted_entities": {},
                "next_action": { "type": "continue", "payload": {} }
            })
        );
    }

    #[test]
    fn test_responder_from_config() {
        let responder = responder_from_config(&RuntimeConfig::default()).unwrap();
        assert_eq!(responder.name(), "mock");

        let disabled = RuntimeConfig {
            mock_responder: false,
            ..RuntimeConfig::default()
        };
        assert!(matches!(
            responder_from_config(&disabled),
            Err(RuntimeError::ResponderNotConfigured)
        ));
    }
}
