//! Pluggable behavior modules, selected by the request's `domain` key.
//!
//! Each handler owns the four pipeline operations (preprocess, system
//! prompt, user payload, postprocess). The set is closed and registered in a
//! static table built at startup.

mod cities;
mod mirror;

pub use cities::{CitiesHandler, find_plate_in_text, normalize_plate};
pub use mirror::MirrorHandler;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SibylCfg;
use crate::error::ConfigError;
use crate::normalize::DEFAULT_DOMAIN;
use crate::output::{NormalizedOutput, OutputShape};
use crate::types::{ModuleOutput, RequestContext};

/// Per-request scratch state produced by `preprocess` and threaded through
/// the remaining handler operations.
#[derive(Debug, Clone, Default)]
pub struct WorkingContext {
    /// Cleaned message text.
    pub text: String,
    pub title: String,
    pub tags: Vec<String>,
    /// Validated zero-padded plate code, when the module uses one.
    pub plate: Option<String>,
    pub city: Option<&'static str>,
    /// Reference context embedded into the prompts.
    pub seed: String,
    /// Set when a required code could not be resolved from the request.
    pub missing_code: bool,
}

/// Generation parameters a module requests from the gateway.
#[derive(Debug, Clone, Copy)]
pub struct GenParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A behavior strategy bound to one or more domain keys.
pub trait ModuleHandler: Send + Sync {
    fn key(&self) -> &'static str;

    fn preprocess(&self, text: &str, ctx: &RequestContext) -> WorkingContext;

    /// A local reply that skips the completion gateway entirely
    /// (e.g. validation guidance). Default: never.
    fn short_circuit(&self, _ctx: &RequestContext, _wc: &WorkingContext) -> Option<ModuleOutput> {
        None
    }

    fn output_shape(&self) -> OutputShape {
        OutputShape::Text
    }

    fn gen_params(&self, cfg: &SibylCfg) -> GenParams;

    fn build_system_prompt(&self, ctx: &RequestContext, wc: &WorkingContext) -> String;

    fn build_user_payload(&self, ctx: &RequestContext, wc: &WorkingContext) -> String;

    fn postprocess(
        &self,
        output: NormalizedOutput,
        ctx: &RequestContext,
        wc: &WorkingContext,
    ) -> ModuleOutput;
}

/// Domain key → handler table. Unknown keys resolve to `"auto"`.
pub struct ModuleRegistry {
    handlers: HashMap<&'static str, Arc<dyn ModuleHandler>>,
    auto: Arc<dyn ModuleHandler>,
}

impl ModuleRegistry {
    /// Build a registry from explicit entries. Fails at construction (a
    /// configuration error, not a request error) when `"auto"` is missing.
    pub fn new(
        entries: Vec<(&'static str, Arc<dyn ModuleHandler>)>,
    ) -> Result<Self, ConfigError> {
        let handlers: HashMap<_, _> = entries.into_iter().collect();
        let auto = handlers
            .get(DEFAULT_DOMAIN)
            .cloned()
            .ok_or(ConfigError::MissingDefaultModule)?;
        Ok(Self { handlers, auto })
    }

    /// The standard production table.
    pub fn standard() -> Result<Self, ConfigError> {
        let mirror: Arc<dyn ModuleHandler> = Arc::new(MirrorHandler);
        let cities: Arc<dyn ModuleHandler> = Arc::new(CitiesHandler);
        Self::new(vec![
            ("auto", Arc::clone(&mirror)),
            ("consciousness_field", Arc::clone(&mirror)),
            ("frequency_field", Arc::clone(&mirror)),
            ("ritual_space", Arc::clone(&mirror)),
            ("library", mirror),
            ("awakened_cities", cities),
        ])
    }

    /// Resolve a domain key, falling back to the default handler.
    pub fn resolve(&self, domain: &str) -> Arc<dyn ModuleHandler> {
        self.handlers
            .get(domain)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.auto))
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("domains", &self.handlers.keys().collect::<Vec<_>>())
            .field("auto", &self.auto.key())
            .finish()
    }
}
