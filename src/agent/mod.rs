use crate::client::MoltbookApi;
use crate::errors::{MoltcheckError, MoltcheckResult};
use crate::models::actions::{ActionEntry, ActionType, RateLimitEvent};
use crate::models::moltbook::{
    Comment, CommentSortOrder, CreateCommentRequest, CreatePostRequest, Post, PostSortOrder,
    VoteDirection, VoteRequest,
};
use crate::services::{ContentAnalyzer, FactChecker, PostCreator};
use crate::state::StateRepository;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

/// How many of the agent's own most recent posts are checked for new
/// comments each cycle.
const OWN_POSTS_TO_CHECK: usize = 10;
/// Comments this long or longer are considered substantive and upvoted.
const SUBSTANTIVE_COMMENT_LEN: usize = 50;
const FEED_FALLBACK_LIMIT: u32 = 25;

/// Phase labels for rate-limit abort records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    FetchingHeartbeat,
    Browsing,
    ReplyingOwnPosts,
    MaybePosting,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::FetchingHeartbeat => "fetching_heartbeat",
            CyclePhase::Browsing => "browsing",
            CyclePhase::ReplyingOwnPosts => "replying_own_posts",
            CyclePhase::MaybePosting => "maybe_posting",
        }
    }
}

pub struct AgentBudgets {
    pub max_posts_per_day: u32,
    pub max_comments_per_cycle: u32,
    pub max_replies_per_cycle: u32,
}

impl Default for AgentBudgets {
    fn default() -> Self {
        Self {
            max_posts_per_day: 3,
            max_comments_per_cycle: 10,
            max_replies_per_cycle: 5,
        }
    }
}

/// Orchestrates one full heartbeat cycle: fetch → browse/engage → reply to
/// comments on own posts → maybe create an original post → log completion.
///
/// Depends only on the collaborator traits, so every external system can be
/// substituted with a deterministic test double.
pub struct Agent {
    forum: Arc<dyn MoltbookApi>,
    state: Arc<dyn StateRepository>,
    analyzer: Arc<dyn ContentAnalyzer>,
    fact_checker: Arc<dyn FactChecker>,
    post_creator: Arc<dyn PostCreator>,
    budgets: AgentBudgets,
    own_username: OnceCell<String>,
}

impl Agent {
    pub fn new(
        forum: Arc<dyn MoltbookApi>,
        state: Arc<dyn StateRepository>,
        analyzer: Arc<dyn ContentAnalyzer>,
        fact_checker: Arc<dyn FactChecker>,
        post_creator: Arc<dyn PostCreator>,
        budgets: AgentBudgets,
    ) -> Self {
        Self {
            forum,
            state,
            analyzer,
            fact_checker,
            post_creator,
            budgets,
            own_username: OnceCell::new(),
        }
    }

    /// Execute one full heartbeat cycle. Never returns an error: every
    /// failure is either recovered per-item, logged at the cycle boundary,
    /// or — for a model rate limit — durably recorded before the cycle ends.
    pub async fn run_cycle(&self) {
        info!("heartbeat cycle start");

        self.fetch_heartbeat().await;

        if let Err(e) = self.browse_and_engage().await {
            if self.abort_on_rate_limit(CyclePhase::Browsing, &e).await {
                return;
            }
            error!(error = %e, "browse phase failed");
        }

        if let Err(e) = self.reply_to_own_posts().await {
            if self
                .abort_on_rate_limit(CyclePhase::ReplyingOwnPosts, &e)
                .await
            {
                return;
            }
            error!(error = %e, "own-post reply phase failed");
        }

        if let Err(e) = self.maybe_create_post().await {
            if self.abort_on_rate_limit(CyclePhase::MaybePosting, &e).await {
                return;
            }
            error!(error = %e, "post creation phase failed");
        }

        if let Err(e) = self.log_completion().await {
            error!(error = %e, "failed to log cycle completion");
        }
        info!("heartbeat cycle complete");
    }

    /// If the error is the model rate-limit signal, durably record it with
    /// phase context and report true so the caller ends the cycle.
    async fn abort_on_rate_limit(&self, phase: CyclePhase, error: &MoltcheckError) -> bool {
        let Some(retry_after) = error.rate_limit_hint() else {
            return false;
        };
        warn!(
            phase = phase.as_str(),
            ?retry_after,
            "model rate limit hit, aborting cycle"
        );

        let details = format!(
            "rate_limited phase={} retry_after={}",
            phase.as_str(),
            retry_after
                .map(|s| s.to_string())
                .unwrap_or_else(|| "none".into())
        );
        if let Err(e) = self
            .state
            .log_action(ActionEntry::new(ActionType::Heartbeat).with_details(details))
            .await
        {
            error!(error = %e, "failed to log rate-limit event");
        }

        match self.state.load_state().await {
            Ok(mut state) => {
                state.last_rate_limit = Some(RateLimitEvent {
                    phase: phase.as_str().to_string(),
                    retry_after,
                    occurred_at: Utc::now(),
                });
                if let Err(e) = self.state.save_state(&state).await {
                    error!(error = %e, "failed to persist rate-limit snapshot");
                }
            }
            Err(e) => error!(error = %e, "failed to load state for rate-limit snapshot"),
        }
        true
    }

    /// Best-effort fetch of the Moltbook heartbeat document. Failure is
    /// logged and swallowed, never fatal.
    async fn fetch_heartbeat(&self) {
        match self.forum.fetch_heartbeat().await {
            Ok(content) => debug!(length = content.len(), "heartbeat document fetched"),
            Err(e) => warn!(error = %e, "heartbeat fetch failed"),
        }
    }

    /// Browse the feed for each sort order, analyze unseen posts, and reply
    /// to checkable claims up to the per-cycle comment budget.
    async fn browse_and_engage(&self) -> MoltcheckResult<()> {
        let mut comments_made = 0u32;

        for sort in [PostSortOrder::Hot, PostSortOrder::New] {
            if comments_made >= self.budgets.max_comments_per_cycle {
                break;
            }

            let posts = match self.fetch_posts_with_fallback(sort).await {
                Some(posts) => posts,
                None => continue,
            };
            if posts.is_empty() {
                continue;
            }

            // Mark posts seen as a side effect of filtering, before any
            // engagement: a failure later in the cycle must never cause the
            // same post to be reconsidered.
            let mut unseen = Vec::new();
            for post in posts {
                if !self.state.is_post_seen(&post.id).await {
                    self.state.mark_post_seen(&post.id).await?;
                    unseen.push(post);
                }
            }

            if let Err(e) = self
                .state
                .log_action(
                    ActionEntry::new(ActionType::FeedBrowsed)
                        .with_details(format!("sort={} unseen={}", sort.as_str(), unseen.len())),
                )
                .await
            {
                warn!(error = %e, "failed to log feed browse");
            }

            if unseen.is_empty() {
                continue;
            }

            let checkable = self.analyzer.filter_checkable(&unseen).await?;

            for (post, analysis) in checkable {
                if comments_made >= self.budgets.max_comments_per_cycle {
                    break;
                }
                match self.engage_post(&post, &analysis).await {
                    Ok(()) => comments_made += 1,
                    Err(err @ MoltcheckError::RateLimit { .. }) => return Err(err),
                    Err(e) => error!(post_id = %post.id, error = %e, "engagement failed"),
                }
            }
        }

        info!(comments_made, "browse complete");
        Ok(())
    }

    async fn fetch_posts_with_fallback(&self, sort: PostSortOrder) -> Option<Vec<Post>> {
        match self.forum.get_posts(sort, None).await {
            Ok(posts) => Some(posts),
            Err(e) => {
                warn!(sort = sort.as_str(), error = %e, "post fetch failed, trying global feed");
                match self.forum.get_feed(sort, FEED_FALLBACK_LIMIT).await {
                    Ok(posts) => Some(posts),
                    Err(e) => {
                        error!(sort = sort.as_str(), error = %e, "feed fetch failed");
                        None
                    }
                }
            }
        }
    }

    /// Generate a fact-check reply for one post, publish it, and vote
    /// according to the verdict.
    async fn engage_post(
        &self,
        post: &Post,
        analysis: &crate::models::llm::AnalysisResult,
    ) -> MoltcheckResult<()> {
        let response = self.fact_checker.generate_reply(post, analysis).await?;

        self.forum
            .create_comment(&CreateCommentRequest {
                post_id: post.id.clone(),
                body: response.response_text.clone(),
                parent_id: None,
            })
            .await?;

        self.state
            .log_action(
                ActionEntry::new(ActionType::CommentCreated)
                    .with_target(&post.id)
                    .with_details(format!("verdict={}", response.verdict)),
            )
            .await?;

        self.vote_on_post(&post.id, &response.verdict).await;
        Ok(())
    }

    /// Upvote for true/mostly_true, downvote for false/misleading, no vote
    /// for anything else — including partially_true and unrecognized
    /// verdict strings. Vote failures are logged, never fatal.
    async fn vote_on_post(&self, post_id: &str, verdict: &str) {
        let direction = match verdict {
            "true" | "mostly_true" => VoteDirection::Upvote,
            "false" | "misleading" => VoteDirection::Downvote,
            _ => return,
        };

        let result = self
            .forum
            .vote(&VoteRequest {
                target_id: post_id.to_string(),
                direction,
            })
            .await;
        match result {
            Ok(()) => {
                if let Err(e) = self
                    .state
                    .log_action(
                        ActionEntry::new(ActionType::VoteCast)
                            .with_target(post_id)
                            .with_details(direction.as_str()),
                    )
                    .await
                {
                    warn!(post_id, error = %e, "failed to log vote");
                }
            }
            Err(e) => warn!(post_id, error = %e, "vote failed"),
        }
    }

    /// Reply to new comments on the agent's own recent posts, up to the
    /// per-cycle reply budget.
    async fn reply_to_own_posts(&self) -> MoltcheckResult<()> {
        let username = match self.own_username().await {
            Some(name) => name,
            None => {
                warn!("own profile unavailable, skipping own-post replies");
                return Ok(());
            }
        };

        let mut own_post_ids = self
            .state
            .get_action_target_ids(ActionType::PostCreated)
            .await?;
        own_post_ids.reverse(); // most recent first
        own_post_ids.dedup();
        own_post_ids.truncate(OWN_POSTS_TO_CHECK);

        let mut replies_made = 0u32;
        'posts: for post_id in own_post_ids {
            let post = match self.forum.get_post(&post_id).await {
                Ok(post) => post,
                Err(e) => {
                    warn!(post_id = %post_id, error = %e, "failed to fetch own post");
                    continue;
                }
            };
            let comments = match self.forum.get_comments(&post_id, CommentSortOrder::New).await
            {
                Ok(comments) => comments,
                Err(e) => {
                    warn!(post_id = %post_id, error = %e, "failed to fetch comments on own post");
                    continue;
                }
            };

            for comment in comments {
                if replies_made >= self.budgets.max_replies_per_cycle {
                    break 'posts;
                }
                if comment.author.as_deref() == Some(username.as_str()) {
                    continue;
                }
                if self.state.is_comment_replied(&comment.id).await {
                    continue;
                }

                match self.reply_to_comment(&post, &comment).await {
                    Ok(()) => replies_made += 1,
                    Err(err @ MoltcheckError::RateLimit { .. }) => return Err(err),
                    Err(e) => {
                        error!(comment_id = %comment.id, error = %e, "comment reply failed");
                    }
                }
            }
        }

        info!(replies_made, "own-post replies complete");
        Ok(())
    }

    async fn reply_to_comment(&self, post: &Post, comment: &Comment) -> MoltcheckResult<()> {
        let reply = self.fact_checker.generate_comment_reply(post, comment).await?;

        self.forum
            .create_comment(&CreateCommentRequest {
                post_id: post.id.clone(),
                body: reply.response_text.clone(),
                parent_id: Some(comment.id.clone()),
            })
            .await?;

        self.state.mark_comment_replied(&comment.id).await?;
        self.state
            .log_action(
                ActionEntry::new(ActionType::CommentReplied)
                    .with_target(&comment.id)
                    .with_details(format!("post={}", post.id)),
            )
            .await?;

        // Substantive comments get an upvote as a courtesy.
        if comment.body.chars().count() >= SUBSTANTIVE_COMMENT_LEN {
            match self
                .forum
                .vote_comment(&comment.id, VoteDirection::Upvote)
                .await
            {
                Ok(()) => {
                    if let Err(e) = self
                        .state
                        .log_action(
                            ActionEntry::new(ActionType::CommentVoteCast)
                                .with_target(&comment.id)
                                .with_details(VoteDirection::Upvote.as_str()),
                        )
                        .await
                    {
                        warn!(comment_id = %comment.id, error = %e, "failed to log comment vote");
                    }
                }
                Err(e) => warn!(comment_id = %comment.id, error = %e, "comment vote failed"),
            }
        }
        Ok(())
    }

    async fn own_username(&self) -> Option<String> {
        self.own_username
            .get_or_try_init(|| async {
                self.forum.get_profile().await.map(|profile| {
                    debug!(username = %profile.username, "own profile cached");
                    profile.username
                })
            })
            .await
            .ok()
            .cloned()
    }

    /// Publish an original post if today's count is still under the daily
    /// cap; otherwise skip silently.
    async fn maybe_create_post(&self) -> MoltcheckResult<()> {
        let today_posts = self
            .state
            .get_today_action_count(ActionType::PostCreated)
            .await?;
        if today_posts >= self.budgets.max_posts_per_day {
            debug!(
                today = today_posts,
                max = self.budgets.max_posts_per_day,
                "daily post limit reached"
            );
            return Ok(());
        }

        let content = self.post_creator.create_post(None, None).await?;
        let post = self
            .forum
            .create_post(&CreatePostRequest {
                title: content.title.clone(),
                body: Some(content.body.clone()),
                submolt: content.target_submolt.clone(),
            })
            .await?;

        self.state
            .log_action(
                ActionEntry::new(ActionType::PostCreated)
                    .with_target(&post.id)
                    .with_details(content.topic_category.unwrap_or_default()),
            )
            .await?;
        info!(post_id = %post.id, "original post published");
        Ok(())
    }

    /// Record the completed cycle and refresh the snapshot.
    async fn log_completion(&self) -> MoltcheckResult<()> {
        self.state
            .log_action(ActionEntry::new(ActionType::Heartbeat))
            .await?;

        let mut state = self.state.load_state().await?;
        state.last_heartbeat = Some(Utc::now());
        state.posts_today = self
            .state
            .get_today_action_count(ActionType::PostCreated)
            .await?;
        state.comments_today = self
            .state
            .get_today_action_count(ActionType::CommentCreated)
            .await?;
        self.state.save_state(&state).await
    }
}
