//! Responder gateway over the generative backend
//!
//! Every call is single-turn: the fixed preamble plus the member's text.
//! Failures and timeouts collapse into a fixed apology.

use crate::llm::{LlmRequest, LlmService};
use crate::runtime::Responder;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const FALLBACK_REPLY: &str = "⚠️ AI system busy. Please try again later.";

pub const MAX_TOKENS: u32 = 500;
pub const TEMPERATURE: f32 = 0.6;

pub struct LlmResponder {
    service: Arc<dyn LlmService>,
    preamble: String,
    timeout: Duration,
}

impl LlmResponder {
    pub fn new(service: Arc<dyn LlmService>, preamble: impl Into<String>, timeout: Duration) -> Self {
        Self {
            service,
            preamble: preamble.into(),
            timeout,
        }
    }

    fn request_for(&self, text: &str) -> LlmRequest {
        LlmRequest {
            system: self.preamble.clone(),
            user: text.to_string(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait]
impl Responder for LlmResponder {
    async fn answer(&self, text: &str) -> String {
        let request = self.request_for(text);

        match tokio::time::timeout(self.timeout, self.service.complete(&request)).await {
            Ok(Ok(response)) if !response.text.is_empty() => response.text,
            Ok(Ok(_)) => {
                tracing::warn!(model = %self.service.model_id(), "Backend returned empty answer");
                FALLBACK_REPLY.to_string()
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, kind = ?e.kind, "Backend failed, sending fallback");
                FALLBACK_REPLY.to_string()
            }
            Err(_) => {
                tracing::warn!(timeout_ms = %self.timeout.as_millis(), "Backend timed out, sending fallback");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
