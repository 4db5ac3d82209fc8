use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{MoltcheckError, MoltcheckResult};

pub const MAX_POST_TITLE_LEN: usize = 300;
pub const MAX_POST_BODY_LEN: usize = 10_000;
pub const MAX_COMMENT_BODY_LEN: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Upvote,
    Downvote,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Upvote => "upvote",
            VoteDirection::Downvote => "downvote",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSortOrder {
    Hot,
    New,
    Top,
    Rising,
}

impl PostSortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostSortOrder::Hot => "hot",
            PostSortOrder::New => "new",
            PostSortOrder::Top => "top",
            PostSortOrder::Rising => "rising",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSortOrder {
    Top,
    New,
    Controversial,
}

impl CommentSortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSortOrder::Top => "top",
            CommentSortOrder::New => "new",
            CommentSortOrder::Controversial => "controversial",
        }
    }
}

// --- Response models ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub karma: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub submolt: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub body: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// --- Request models ---

#[derive(Debug, Clone, Serialize)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub submolt: String,
}

impl CreatePostRequest {
    pub fn validate(&self) -> MoltcheckResult<()> {
        if self.title.is_empty() || self.title.chars().count() > MAX_POST_TITLE_LEN {
            return Err(MoltcheckError::Validation(format!(
                "post title must be 1-{} characters",
                MAX_POST_TITLE_LEN
            )));
        }
        if let Some(body) = &self.body {
            if body.chars().count() > MAX_POST_BODY_LEN {
                return Err(MoltcheckError::Validation(format!(
                    "post body must be at most {} characters",
                    MAX_POST_BODY_LEN
                )));
            }
        }
        if self.submolt.is_empty() {
            return Err(MoltcheckError::Validation("submolt must be set".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCommentRequest {
    pub post_id: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl CreateCommentRequest {
    pub fn validate(&self) -> MoltcheckResult<()> {
        if self.post_id.is_empty() {
            return Err(MoltcheckError::Validation("post_id must be set".into()));
        }
        if self.body.is_empty() || self.body.chars().count() > MAX_COMMENT_BODY_LEN {
            return Err(MoltcheckError::Validation(format!(
                "comment body must be 1-{} characters",
                MAX_COMMENT_BODY_LEN
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteRequest {
    pub target_id: String,
    pub direction: VoteDirection,
}

// --- Response envelope ---

/// Standard Moltbook response wrapper. `success=false` carries an error
/// message and an optional human-readable hint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

fn default_success() -> bool {
    true
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the envelope into its payload, mapping API-level failures to
    /// a typed error.
    pub fn into_data(self) -> MoltcheckResult<T> {
        if !self.success {
            return Err(MoltcheckError::Api {
                message: self.error.unwrap_or_else(|| "Unknown error".into()),
                hint: self.hint,
                retryable: false,
            });
        }
        self.data.ok_or_else(|| MoltcheckError::Api {
            message: "response envelope missing data".into(),
            hint: None,
            retryable: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_unwraps_data() {
        let env: ApiEnvelope<Vec<u32>> =
            serde_json::from_str(r#"{"success": true, "data": [1, 2]}"#).unwrap();
        assert_eq!(env.into_data().unwrap(), vec![1, 2]);
    }

    #[test]
    fn envelope_failure_carries_hint() {
        let env: ApiEnvelope<Vec<u32>> = serde_json::from_str(
            r#"{"success": false, "error": "nope", "hint": "slow down"}"#,
        )
        .unwrap();
        match env.into_data().unwrap_err() {
            MoltcheckError::Api { message, hint, .. } => {
                assert_eq!(message, "nope");
                assert_eq!(hint.as_deref(), Some("slow down"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn comment_request_rejects_oversized_body() {
        let req = CreateCommentRequest {
            post_id: "p1".into(),
            body: "x".repeat(MAX_COMMENT_BODY_LEN + 1),
            parent_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn post_request_valid() {
        let req = CreatePostRequest {
            title: "Title".into(),
            body: Some("Body".into()),
            submolt: "science".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn post_deserializes_with_missing_optionals() {
        let post: Post =
            serde_json::from_str(r#"{"id": "p1", "title": "hello"}"#).unwrap();
        assert_eq!(post.id, "p1");
        assert!(post.body.is_none());
        assert_eq!(post.score, 0);
    }
}
