use sibyl_llm::provider::LlmError;

/// Fatal misconfiguration, surfaced at startup — never per request.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
    #[error("module registry has no \"auto\" handler")]
    MissingDefaultModule,
}

/// The only per-request failure visible to callers. Everything else in the
/// pipeline degrades to a best-effort structured response.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error("generation failed: {0}")]
    Provider(#[from] LlmError),
}
