use crate::errors::{MoltcheckError, MoltcheckResult};
use crate::models::llm::{AnalysisResult, CommentReplyResponse, FactCheckResponse};
use crate::models::moltbook::{Comment, Post};
use crate::prompts;
use crate::providers::ModelProvider;
use crate::safety;
use crate::services::FactChecker;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

const POST_BODY_EXCERPT_CHARS: usize = 500;

/// Generates fact-check replies and conversational comment replies.
pub struct FactCheckerService {
    model: Arc<dyn ModelProvider>,
}

impl FactCheckerService {
    pub fn new(model: Arc<dyn ModelProvider>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl FactChecker for FactCheckerService {
    async fn generate_reply(
        &self,
        post: &Post,
        analysis: &AnalysisResult,
    ) -> MoltcheckResult<FactCheckResponse> {
        // Sanitize independently of the analyzer; upstream scrubbing is not
        // assumed to have happened or to have been sufficient.
        let title = safety::sanitize(&post.title);
        let body = safety::sanitize(post.body.as_deref().unwrap_or(""));

        // The claim summary is model output from the first call. A crafted
        // post can convince that call to echo an injection payload, so it is
        // treated as untrusted input to this second call.
        let raw_summary = analysis.claim_summary.as_deref().unwrap_or("unspecified claim");
        if safety::is_suspicious(raw_summary) {
            warn!(post_id = %post.id, "claim summary from analyzer flagged as suspicious");
        }
        let claim_summary = safety::sanitize(raw_summary);

        let prompt = prompts::fact_check_reply(&title, &body, &claim_summary);
        let raw = self
            .model
            .generate_json(prompts::SYSTEM_PERSONA, &prompt)
            .await?;
        let response: FactCheckResponse = serde_json::from_value(raw).map_err(|e| {
            MoltcheckError::Validation(format!("fact-check response malformed: {}", e))
        })?;
        response.validate()?;

        info!(post_id = %post.id, verdict = %response.verdict, "fact-check generated");
        Ok(response)
    }

    async fn generate_comment_reply(
        &self,
        post: &Post,
        comment: &Comment,
    ) -> MoltcheckResult<CommentReplyResponse> {
        let title = safety::sanitize(&post.title);
        let body = safety::sanitize(post.body.as_deref().unwrap_or(""));
        let excerpt: String = body.chars().take(POST_BODY_EXCERPT_CHARS).collect();
        let comment_body = safety::sanitize(&comment.body);
        let author = safety::sanitize(comment.author.as_deref().unwrap_or("anonymous"));

        let prompt = prompts::comment_reply(&title, &excerpt, &comment_body, &author);
        let raw = self
            .model
            .generate_json(prompts::SYSTEM_PERSONA, &prompt)
            .await?;
        let response: CommentReplyResponse = serde_json::from_value(raw).map_err(|e| {
            MoltcheckError::Validation(format!("comment reply malformed: {}", e))
        })?;
        response.validate()?;

        info!(comment_id = %comment.id, "comment reply generated");
        Ok(response)
    }
}
