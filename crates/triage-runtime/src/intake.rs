//! Intake flow: one conversational turn at a time.
//!
//! Every message goes through the crisis detector first. A match ends the
//! turn with the crisis message and a `stop` action; the responder is never
//! called and no routing happens. Otherwise the responder produces the reply,
//! bounded by the configured timeout, with a neutral fallback on failure.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use triage_core::{
    lookup_or_default, BuiltinResources, Bucket, CountryResource, Engine, EngineConfig,
    Explanation, ResourceDirectory, ResourceLookup, RoutingDecision, ScoreResponse, ScoreTotals,
    TriageError,
};

use crate::audit::{AuditEvent, AuditRecord};
use crate::config::RuntimeConfig;
use crate::responder::{responder_from_config, MessageReply, NextAction, Responder, ResponderError};
use crate::RuntimeError;

const CRISIS_INTENT: &str = "crisis";
const FALLBACK_INTENT: &str = "fallback";
const FALLBACK_MESSAGE: &str =
    "Thank you for sharing. You can keep telling me more, or continue with the questionnaire.";

/// Result of handling one message.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeOutcome {
    pub reply: MessageReply,
    pub crisis: bool,
    pub audit: AuditRecord,
}

/// Routing result as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReply {
    pub bucket: Bucket,
    pub recommendation: String,
    pub scores: ScoreTotals,
    pub crisis: bool,
    pub explanation: Explanation,
}

impl From<RoutingDecision> for RouteReply {
    fn from(decision: RoutingDecision) -> Self {
        Self {
            bucket: decision.bucket,
            recommendation: decision.recommendation,
            scores: decision.scores,
            crisis: false,
            explanation: decision.explanation,
        }
    }
}

/// The intake flow wires the engine, a responder and a resource source.
pub struct IntakeFlow {
    engine: Arc<Engine>,
    responder: Arc<dyn Responder>,
    resources: Arc<dyn ResourceLookup>,
    config: RuntimeConfig,
}

impl IntakeFlow {
    pub fn new(
        engine: Arc<Engine>,
        responder: Arc<dyn Responder>,
        resources: Arc<dyn ResourceLookup>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            engine,
            responder,
            resources,
            config,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Resource record for `country` (or the configured default country).
    /// Never fails. May read files; async callers use the blocking pool.
    pub fn resources_for(&self, country: Option<&str>) -> CountryResource {
        let country = country.unwrap_or(&self.config.default_country);
        lookup_or_default(self.resources.as_ref(), country)
    }

    /// [`Self::resources_for`], run on the blocking pool.
    async fn lookup_resource(&self, country: Option<&str>) -> CountryResource {
        let country = country.unwrap_or(&self.config.default_country).to_string();
        let resources = Arc::clone(&self.resources);

        match tokio::task::spawn_blocking(move || lookup_or_default(resources.as_ref(), &country))
            .await
        {
            Ok(resource) => resource,
            Err(e) => {
                tracing::warn!(error = %e, "Resource lookup task failed, using built-in default");
                CountryResource::default()
            }
        }
    }

    /// Handle one free-text message.
    ///
    /// # Execution Flow
    /// 1. Crisis check (deterministic, always first)
    /// 2. On a match: crisis message, `stop` action, `crisis_override` audit
    /// 3. Otherwise: responder under timeout, `llm_called` audit
    /// 4. On responder failure: fallback reply, `responder_fallback` audit
    pub async fn handle_message(&self, text: &str, country: Option<&str>) -> IntakeOutcome {
        if let Some(found) = self.engine.crisis_match(text) {
            let resource = self.lookup_resource(country).await;
            tracing::info!(phrase_id = %found.phrase_id, "Crisis override, skipping responder");

            return IntakeOutcome {
                reply: MessageReply {
                    intent: CRISIS_INTENT.to_string(),
                    user_message: self.engine.format_crisis_response(&resource),
                    extracted_entities: serde_json::json!({}),
                    next_action: NextAction::stop(),
                },
                crisis: true,
                audit: AuditRecord::from_serializable(AuditEvent::CrisisOverride, &found),
            };
        }

        match self.generate(text).await {
            Ok(reply) => {
                let audit = AuditRecord::from_serializable(AuditEvent::LlmCalled, &reply);
                IntakeOutcome {
                    reply,
                    crisis: false,
                    audit,
                }
            }
            Err(e) => {
                tracing::warn!(
                    responder = self.responder.name(),
                    error = %e,
                    "Responder failed, using fallback reply"
                );
                IntakeOutcome {
                    reply: fallback_reply(),
                    crisis: false,
                    audit: AuditRecord::new(
                        AuditEvent::ResponderFallback,
                        serde_json::json!({
                            "responder": self.responder.name(),
                            "error": e.to_string(),
                        }),
                    ),
                }
            }
        }
    }

    async fn generate(&self, text: &str) -> Result<MessageReply, ResponderError> {
        let timeout = self.config.responder_timeout;
        match tokio::time::timeout(timeout, self.responder.generate(text)).await {
            Ok(result) => result,
            Err(_) => Err(ResponderError::Timeout(timeout)),
        }
    }

    /// Route recorded questionnaire answers.
    pub fn route(&self, responses: &[ScoreResponse], age_band: &str) -> (RouteReply, AuditRecord) {
        let decision = self.engine.route_responses(responses, age_band);
        let audit = AuditRecord::from_serializable(AuditEvent::Routing, &decision);
        (RouteReply::from(decision), audit)
    }
}

fn fallback_reply() -> MessageReply {
    MessageReply {
        intent: FALLBACK_INTENT.to_string(),
        user_message: FALLBACK_MESSAGE.to_string(),
        extracted_entities: serde_json::json!({}),
        next_action: NextAction::continue_(),
    }
}

/// Builder for IntakeFlow.
pub struct IntakeFlowBuilder {
    engine: Option<Arc<Engine>>,
    responder: Option<Arc<dyn Responder>>,
    resources: Option<Arc<dyn ResourceLookup>>,
    config: RuntimeConfig,
}

impl IntakeFlowBuilder {
    pub fn new() -> Self {
        Self {
            engine: None,
            responder: None,
            resources: None,
            config: RuntimeConfig::default(),
        }
    }

    pub fn engine(mut self, engine: Arc<Engine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn responder(mut self, responder: Arc<dyn Responder>) -> Self {
        self.responder = Some(responder);
        self
    }

    pub fn resources(mut self, resources: Arc<dyn ResourceLookup>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the flow, filling unset parts from the configuration.
    pub fn build(self) -> Result<IntakeFlow, RuntimeError> {
        let engine = match self.engine {
            Some(engine) => engine,
            None => Arc::new(Engine::new(EngineConfig::default()).map_err(TriageError::from)?),
        };

        let responder = match self.responder {
            Some(responder) => responder,
            None => responder_from_config(&self.config)?,
        };

        let resources: Arc<dyn ResourceLookup> = match (self.resources, &self.config.resources_dir) {
            (Some(resources), _) => resources,
            (None, Some(dir)) => Arc::new(ResourceDirectory::new(dir)),
            (None, None) => Arc::new(BuiltinResources),
        };

        Ok(IntakeFlow::new(engine, responder, resources, self.config))
    }
}

impl Default for IntakeFlowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
