use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Every externally visible action the agent can take, as recorded in the
/// append-only action log. The log is the system of record for daily budget
/// counts and for looking up past action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Heartbeat,
    PostCreated,
    CommentCreated,
    CommentReplied,
    VoteCast,
    CommentVoteCast,
    SubmoltJoined,
    FeedBrowsed,
    ProfileUpdated,
}

/// One append-only action log entry. Never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEntry {
    pub action_type: ActionType,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActionEntry {
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            target_id: None,
            details: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Record of a model rate-limit hit that aborted a cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitEvent {
    pub phase: String,
    #[serde(default)]
    pub retry_after: Option<u64>,
    pub occurred_at: DateTime<Utc>,
}

/// Current-state snapshot. A convenience cache over data whose authoritative
/// source is the action log and the seen/replied sets; loaded at startup,
/// mutated in memory during a cycle, persisted at checkpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(default)]
    pub last_heartbeat: Option<DateTime<Utc>>,
    #[serde(default)]
    pub posts_today: u32,
    #[serde(default)]
    pub comments_today: u32,
    #[serde(default)]
    pub seen_post_ids: HashSet<String>,
    #[serde(default)]
    pub last_rate_limit: Option<RateLimitEvent>,
}
