pub mod analyzer;
pub mod fact_checker;
pub mod post_creator;

use crate::errors::MoltcheckResult;
use crate::models::llm::{
    AnalysisResult, CommentReplyResponse, FactCheckResponse, OriginalPostContent,
};
use crate::models::moltbook::{Comment, Post};
use async_trait::async_trait;

pub use analyzer::ContentAnalyzerService;
pub use fact_checker::FactCheckerService;
pub use post_creator::PostCreatorService;

/// Identifies fact-checkable claims in posts.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(&self, post: &Post) -> MoltcheckResult<AnalysisResult>;

    /// Filter a batch of posts down to the checkable subset, rejecting
    /// suspicious ones outright. Output preserves input order.
    async fn filter_checkable(
        &self,
        posts: &[Post],
    ) -> MoltcheckResult<Vec<(Post, AnalysisResult)>>;
}

/// Generates public fact-check replies and conversational comment replies.
#[async_trait]
pub trait FactChecker: Send + Sync {
    async fn generate_reply(
        &self,
        post: &Post,
        analysis: &AnalysisResult,
    ) -> MoltcheckResult<FactCheckResponse>;

    async fn generate_comment_reply(
        &self,
        post: &Post,
        comment: &Comment,
    ) -> MoltcheckResult<CommentReplyResponse>;
}

/// Authors original posts on rotated topic categories.
#[async_trait]
pub trait PostCreator: Send + Sync {
    async fn create_post(
        &self,
        category: Option<&str>,
        submolt: Option<&str>,
    ) -> MoltcheckResult<OriginalPostContent>;
}
