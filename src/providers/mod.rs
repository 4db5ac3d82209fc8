pub mod gemini;

use crate::errors::MoltcheckResult;
use async_trait::async_trait;

pub use gemini::GeminiProvider;

/// Abstract language-model backend.
///
/// Both methods may fail with [`crate::errors::MoltcheckError::RateLimit`],
/// the one failure mode the orchestrator treats as cycle-aborting. No
/// provider-specific error type crosses this boundary.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate a text response given system and user prompts.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> MoltcheckResult<String>;

    /// Generate a structured JSON response.
    async fn generate_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> MoltcheckResult<serde_json::Value>;
}

/// Strip a markdown code fence from model output, if present. Models in
/// JSON mode occasionally wrap the object in ```json ... ``` anyway.
pub fn strip_json_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_fence_plain_json_untouched() {
        assert_eq!(strip_json_fence(r#"{"a": 1}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn strip_fence_removes_json_fence() {
        assert_eq!(strip_json_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn strip_fence_removes_bare_fence() {
        assert_eq!(strip_json_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }
}
