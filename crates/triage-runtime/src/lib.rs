//! # triage-runtime
//!
//! Async intake flow around the triage engine.
//!
//! This crate handles a conversational turn: crisis check first, then a
//! responder for everything else. It also wraps questionnaire routing with
//! the audit record the request layer is expected to store.
//!
//! ## Important
//!
//! The decision logic lives in `triage-core` and is fully deterministic.
//! The responder here never sees a message that matched a crisis phrase.
//!
//! ## Example
//!
//! ```rust,ignore
//! use triage_runtime::{IntakeFlowBuilder, RuntimeConfig};
//!
//! let flow = IntakeFlowBuilder::new()
//!     .config(RuntimeConfig::from_env())
//!     .build()?;
//!
//! let outcome = flow.handle_message("I can't sleep lately", Some("tr")).await;
//! if outcome.crisis {
//!     // stop the conversation, show outcome.reply.user_message
//! }
//! ```

pub mod audit;
pub mod config;
pub mod intake;
pub mod responder;

pub use audit::{AuditEvent, AuditRecord};
pub use config::RuntimeConfig;
pub use intake::{IntakeFlow, IntakeFlowBuilder, IntakeOutcome, RouteReply};
pub use responder::{
    responder_from_config, ActionKind, MessageReply, MockResponder, NextAction, Responder,
    ResponderError,
};

use thiserror::Error;
use triage_core::TriageError;

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Responder not configured (only the mock responder is available)")]
    ResponderNotConfigured,

    #[error("Engine error: {0}")]
    Triage(#[from] TriageError),
}
