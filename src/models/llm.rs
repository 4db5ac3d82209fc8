use serde::{Deserialize, Serialize};

use crate::errors::{MoltcheckError, MoltcheckResult};

/// Result of analyzing a post for fact-checkable claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub has_checkable_claim: bool,
    #[serde(default)]
    pub claim_summary: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl AnalysisResult {
    /// Safe default used when analysis fails: never engage on an error.
    pub fn not_checkable(reasoning: impl Into<String>) -> Self {
        Self {
            has_checkable_claim: false,
            claim_summary: None,
            confidence: 0.0,
            reasoning: Some(reasoning.into()),
        }
    }
}

/// Generated fact-check reply to a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckResponse {
    pub response_text: String,
    /// One of: false, misleading, partially_true, mostly_true, true.
    /// Unrecognized values mean "skip voting".
    pub verdict: String,
    #[serde(default)]
    pub sources_used: Vec<String>,
}

impl FactCheckResponse {
    pub fn validate(&self) -> MoltcheckResult<()> {
        let len = self.response_text.chars().count();
        if len == 0 || len > 5_000 {
            return Err(MoltcheckError::Validation(
                "fact-check reply must be 1-5000 characters".into(),
            ));
        }
        Ok(())
    }
}

/// Generated conversational reply to a comment on the agent's own post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentReplyResponse {
    pub response_text: String,
}

impl CommentReplyResponse {
    pub fn validate(&self) -> MoltcheckResult<()> {
        let len = self.response_text.chars().count();
        if len == 0 || len > 2_000 {
            return Err(MoltcheckError::Validation(
                "comment reply must be 1-2000 characters".into(),
            ));
        }
        Ok(())
    }
}

/// Generated content for an original myth-busting post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginalPostContent {
    pub title: String,
    pub body: String,
    #[serde(default = "default_submolt")]
    pub target_submolt: String,
    #[serde(default)]
    pub topic_category: Option<String>,
}

fn default_submolt() -> String {
    "science".into()
}

impl OriginalPostContent {
    pub fn validate(&self) -> MoltcheckResult<()> {
        let title_len = self.title.chars().count();
        if title_len == 0 || title_len > 300 {
            return Err(MoltcheckError::Validation(
                "post title must be 1-300 characters".into(),
            ));
        }
        let body_len = self.body.chars().count();
        if body_len == 0 || body_len > 10_000 {
            return Err(MoltcheckError::Validation(
                "post body must be 1-10000 characters".into(),
            ));
        }
        Ok(())
    }
}
