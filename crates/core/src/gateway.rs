//! Completion gateway: the one place the external LLM is invoked.
//!
//! Wraps the provider with the module's generation parameters and a hard
//! timeout. No retries — silently replaying a stateful conversational call
//! is worse than surfacing the failure.

use std::sync::Arc;
use std::time::Duration;

use sibyl_llm::provider::{ChatMessage, CompletionRequest, LlmError, LlmProvider};

use crate::modules::GenParams;

pub struct CompletionGateway {
    provider: Arc<dyn LlmProvider>,
    timeout_secs: u64,
}

impl CompletionGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout_secs: u64) -> Self {
        Self { provider, timeout_secs }
    }

    /// Run one completion. `messages` carries exactly one system message
    /// first, then interleaved history, newest user message last. An empty
    /// completion is a valid result, not an error.
    pub async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        params: GenParams,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest {
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let fut = self.provider.complete(request);
        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), fut).await {
            Ok(Ok(response)) => Ok(response.content),
            Ok(Err(e)) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "completion failed");
                Err(e)
            }
            Err(_) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    timeout_secs = self.timeout_secs,
                    "completion timed out"
                );
                Err(LlmError::Timeout(self.timeout_secs))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sibyl_llm::provider::MockProvider;

    fn params() -> GenParams {
        GenParams { temperature: 0.15, max_tokens: 180 }
    }

    #[tokio::test]
    async fn passes_through_provider_content() {
        let gw = CompletionGateway::new(Arc::new(MockProvider::new("seen")), 5);
        let out = gw.complete(vec![ChatMessage::user("hi")], params()).await.unwrap();
        assert_eq!(out, "seen");
    }

    #[tokio::test]
    async fn provider_error_surfaces_once() {
        let mock = Arc::new(MockProvider::failing());
        let gw = CompletionGateway::new(Arc::clone(&mock) as Arc<dyn LlmProvider>, 5);
        let err = gw.complete(vec![ChatMessage::user("hi")], params()).await.unwrap_err();
        assert!(matches!(err, LlmError::RequestFailed(_)));
        // exactly one attempt — no automatic retry
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_completion_is_not_an_error() {
        let gw = CompletionGateway::new(Arc::new(MockProvider::new("")), 5);
        let out = gw.complete(vec![ChatMessage::user("hi")], params()).await.unwrap();
        assert_eq!(out, "");
    }
}
