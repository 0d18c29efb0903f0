//! Request orchestrator: the control flow tying one ask together.
//!
//! Phase order is fixed; the invariant that matters is that session memory
//! is mutated only in the Committed transition — a failed or invalid
//! generation leaves prior history byte-identical.

use std::fmt;
use std::sync::Arc;

use serde_json::json;

use crate::config::SibylCfg;
use crate::durable::DurableStore;
use crate::error::AskError;
use crate::gateway::CompletionGateway;
use crate::memory::SessionStore;
use crate::modules::ModuleRegistry;
use crate::normalize;
use crate::output::{self, NormalizedOutput, OutputShape};
use crate::prompt;
use crate::types::{AskRequest, ModuleOutput, TurnRole};

/// Session id used when the caller supplies none.
pub const DEFAULT_SESSION: &str = "default";

/// Per-request lifecycle, logged at each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskPhase {
    Received,
    Normalized,
    ModuleResolved,
    PromptBuilt,
    Generating,
    OutputValidated,
    Committed,
    Errored,
}

impl fmt::Display for AskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::Normalized => "normalized",
            Self::ModuleResolved => "module_resolved",
            Self::PromptBuilt => "prompt_built",
            Self::Generating => "generating",
            Self::OutputValidated => "output_validated",
            Self::Committed => "committed",
            Self::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// A completed ask: the structured output plus the session it belongs to.
#[derive(Debug, Clone)]
pub struct AskOutcome {
    pub session_id: String,
    pub output: ModuleOutput,
}

pub struct Orchestrator {
    cfg: Arc<SibylCfg>,
    registry: ModuleRegistry,
    store: Arc<dyn SessionStore>,
    gateway: CompletionGateway,
    durable: Arc<dyn DurableStore>,
}

impl Orchestrator {
    pub fn new(
        cfg: Arc<SibylCfg>,
        registry: ModuleRegistry,
        store: Arc<dyn SessionStore>,
        gateway: CompletionGateway,
        durable: Arc<dyn DurableStore>,
    ) -> Self {
        Self { cfg, registry, store, gateway, durable }
    }

    /// Run one ask through the pipeline.
    pub async fn ask(&self, req: AskRequest) -> Result<AskOutcome, AskError> {
        let session_id = req
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION)
            .to_owned();

        tracing::debug!(session = %session_id, phase = %AskPhase::Received, "ask");

        // Blank input: trivial response before Normalized — no memory, no gateway.
        if req.text().trim().is_empty() {
            return Ok(AskOutcome {
                session_id,
                output: ModuleOutput::text("mirror", "", ""),
            });
        }

        self.store.evict_expired();

        let normalized = normalize::normalize(&req, &self.cfg);
        let ctx = normalized.context;
        tracing::debug!(
            session = %session_id,
            phase = %AskPhase::Normalized,
            domain = %ctx.domain,
            gate_mode = ctx.gate_mode.as_str(),
            persona = ctx.persona.as_str(),
            "ask"
        );

        let handler = self.registry.resolve(&ctx.domain);
        tracing::debug!(session = %session_id, phase = %AskPhase::ModuleResolved, module = handler.key(), "ask");

        let wc = handler.preprocess(&normalized.text, &ctx);

        // Local guidance replies (e.g. a missing lookup code) never reach the
        // gateway and never touch memory.
        if let Some(output) = handler.short_circuit(&ctx, &wc) {
            self.log_event("ask_short_circuit", &ctx.domain, &session_id);
            return Ok(AskOutcome { session_id, output });
        }

        let system = handler.build_system_prompt(&ctx, &wc);
        let payload = handler.build_user_payload(&ctx, &wc);
        let history = self.store.history(&session_id);
        let messages = prompt::build_messages(&system, &history, &payload);
        tracing::debug!(
            session = %session_id,
            phase = %AskPhase::PromptBuilt,
            history_turns = history.len(),
            "ask"
        );

        tracing::debug!(session = %session_id, phase = %AskPhase::Generating, "ask");
        let raw = match self.gateway.complete(messages, handler.gen_params(&self.cfg)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(session = %session_id, phase = %AskPhase::Errored, error = %e, "ask");
                self.log_event("ask_failed", &ctx.domain, &session_id);
                return Err(AskError::Provider(e));
            }
        };

        let normalized_output = match handler.output_shape() {
            OutputShape::Text => NormalizedOutput::Text(output::normalize_text(&raw, ctx.lang)),
            OutputShape::Json => NormalizedOutput::Json(output::extract_json(&raw)),
        };
        tracing::debug!(session = %session_id, phase = %AskPhase::OutputValidated, "ask");

        let output = handler.postprocess(normalized_output, &ctx, &wc);

        // Committed: the only transition that mutates session memory.
        self.store.append(&session_id, TurnRole::User, &normalized.text);
        self.store.append(&session_id, TurnRole::Assistant, &output.answer);
        tracing::debug!(session = %session_id, phase = %AskPhase::Committed, "ask");

        self.log_memory(&ctx.domain, &normalized.text, &output.answer);
        self.log_event("ask", &ctx.domain, &session_id);

        Ok(AskOutcome { session_id, output })
    }

    /// Fire-and-forget event record.
    fn log_event(&self, kind: &'static str, domain: &str, session_id: &str) {
        let durable = Arc::clone(&self.durable);
        let domain = domain.to_owned();
        let meta = json!({ "session_id": session_id });
        tokio::spawn(async move {
            durable.record_event(kind, &domain, meta).await;
        });
    }

    /// Fire-and-forget exchange record.
    fn log_memory(&self, domain: &str, input: &str, output: &str) {
        let durable = Arc::clone(&self.durable);
        let domain = domain.to_owned();
        let input = input.to_owned();
        let output = output.to_owned();
        tokio::spawn(async move {
            durable.record_memory("turn", &domain, &input, &output).await;
        });
    }
}
