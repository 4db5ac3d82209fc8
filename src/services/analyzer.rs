use crate::errors::{MoltcheckError, MoltcheckResult};
use crate::models::llm::AnalysisResult;
use crate::models::moltbook::Post;
use crate::prompts;
use crate::providers::ModelProvider;
use crate::safety;
use crate::services::ContentAnalyzer;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// Analyzes posts to determine whether they contain fact-checkable claims.
pub struct ContentAnalyzerService {
    model: Arc<dyn ModelProvider>,
    min_confidence: f64,
}

impl ContentAnalyzerService {
    pub fn new(model: Arc<dyn ModelProvider>) -> Self {
        Self {
            model,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }
}

#[async_trait]
impl ContentAnalyzer for ContentAnalyzerService {
    async fn analyze(&self, post: &Post) -> MoltcheckResult<AnalysisResult> {
        let title = safety::sanitize(&post.title);
        let body = safety::sanitize(post.body.as_deref().unwrap_or(""));
        let prompt = prompts::analyze_post(
            &title,
            &body,
            post.submolt.as_deref().unwrap_or("general"),
        );

        match self
            .model
            .generate_json(prompts::SYSTEM_PERSONA, &prompt)
            .await
            .and_then(|raw| {
                serde_json::from_value::<AnalysisResult>(raw).map_err(|e| {
                    MoltcheckError::Validation(format!("analysis result malformed: {}", e))
                })
            }) {
            Ok(result) => {
                info!(
                    post_id = %post.id,
                    has_claim = result.has_checkable_claim,
                    confidence = result.confidence,
                    "post analyzed"
                );
                Ok(result)
            }
            // Rate limits must surface so the cycle can abort.
            Err(err @ MoltcheckError::RateLimit { .. }) => Err(err),
            // Everything else degrades to "not checkable": a failed analysis
            // never produces an engagement.
            Err(err) => {
                error!(post_id = %post.id, error = %err, "analysis failed");
                Ok(AnalysisResult::not_checkable(format!(
                    "analysis error: {}",
                    err
                )))
            }
        }
    }

    async fn filter_checkable(
        &self,
        posts: &[Post],
    ) -> MoltcheckResult<Vec<(Post, AnalysisResult)>> {
        let mut results = Vec::new();
        for post in posts {
            // Suspicious raw content is rejected before it reaches the model
            // at all; scrubbing is not enough for outright injection attempts.
            if safety::is_suspicious(&post.title)
                || safety::is_suspicious(post.body.as_deref().unwrap_or(""))
            {
                warn!(post_id = %post.id, "suspicious post skipped");
                continue;
            }

            let analysis = self.analyze(post).await?;
            if analysis.has_checkable_claim && analysis.confidence >= self.min_confidence {
                results.push((post.clone(), analysis));
            }
        }

        info!(total = posts.len(), checkable = results.len(), "filter complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests;
