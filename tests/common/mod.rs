#![allow(dead_code)]

use async_trait::async_trait;
use moltcheck::client::MoltbookApi;
use moltcheck::errors::{MoltcheckError, MoltcheckResult};
use moltcheck::models::moltbook::{
    AgentProfile, Comment, CommentSortOrder, CreateCommentRequest, CreatePostRequest, Post,
    PostSortOrder, VoteDirection, VoteRequest,
};
use moltcheck::providers::ModelProvider;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub fn post(id: &str, title: &str, body: &str) -> Post {
    Post {
        id: id.into(),
        title: title.into(),
        body: Some(body.into()),
        author: Some("someone".into()),
        submolt: Some("science".into()),
        score: 0,
        comment_count: 0,
        created_at: None,
    }
}

pub fn comment(id: &str, post_id: &str, author: &str, body: &str) -> Comment {
    Comment {
        id: id.into(),
        body: body.into(),
        author: Some(author.into()),
        post_id: Some(post_id.into()),
        parent_id: None,
        score: 0,
        created_at: None,
    }
}

/// Model double that replays a fixed script of JSON results in call order.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<MoltcheckResult<Value>>>,
    pub calls: AtomicU32,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<MoltcheckResult<Value>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for ScriptedModel {
    async fn generate(&self, _system: &str, _user: &str) -> MoltcheckResult<String> {
        Ok(String::new())
    }

    async fn generate_json(&self, _system: &str, user: &str) -> MoltcheckResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(user.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(MoltcheckError::Validation(
                    "scripted model exhausted".into(),
                ))
            })
    }
}

/// In-memory Moltbook double recording every write it receives.
#[derive(Default)]
pub struct MockForum {
    pub posts_hot: Vec<Post>,
    pub posts_new: Vec<Post>,
    pub posts_by_id: HashMap<String, Post>,
    pub comments_by_post: HashMap<String, Vec<Comment>>,
    pub username: String,

    pub created_comments: Mutex<Vec<CreateCommentRequest>>,
    pub created_posts: Mutex<Vec<CreatePostRequest>>,
    pub votes: Mutex<Vec<VoteRequest>>,
    pub comment_votes: Mutex<Vec<(String, VoteDirection)>>,
    next_id: AtomicU32,
}

impl MockForum {
    pub fn new() -> Self {
        Self {
            username: "moltcheck".into(),
            ..Default::default()
        }
    }

    fn next(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl MoltbookApi for MockForum {
    async fn get_posts(
        &self,
        sort: PostSortOrder,
        _submolt: Option<&str>,
    ) -> MoltcheckResult<Vec<Post>> {
        Ok(match sort {
            PostSortOrder::Hot => self.posts_hot.clone(),
            PostSortOrder::New => self.posts_new.clone(),
            _ => Vec::new(),
        })
    }

    async fn get_feed(&self, _sort: PostSortOrder, _limit: u32) -> MoltcheckResult<Vec<Post>> {
        Ok(Vec::new())
    }

    async fn get_post(&self, post_id: &str) -> MoltcheckResult<Post> {
        self.posts_by_id
            .get(post_id)
            .cloned()
            .ok_or_else(|| MoltcheckError::Api {
                message: format!("no such post: {}", post_id),
                hint: None,
                retryable: false,
            })
    }

    async fn create_post(&self, request: &CreatePostRequest) -> MoltcheckResult<Post> {
        request.validate()?;
        self.created_posts.lock().unwrap().push(request.clone());
        Ok(post(
            &format!("created-{}", self.next()),
            &request.title,
            request.body.as_deref().unwrap_or(""),
        ))
    }

    async fn delete_post(&self, _post_id: &str) -> MoltcheckResult<()> {
        Ok(())
    }

    async fn get_comments(
        &self,
        post_id: &str,
        _sort: CommentSortOrder,
    ) -> MoltcheckResult<Vec<Comment>> {
        Ok(self
            .comments_by_post
            .get(post_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_comment(&self, request: &CreateCommentRequest) -> MoltcheckResult<Comment> {
        request.validate()?;
        self.created_comments.lock().unwrap().push(request.clone());
        Ok(comment(
            &format!("created-c{}", self.next()),
            &request.post_id,
            "moltcheck",
            &request.body,
        ))
    }

    async fn vote(&self, request: &VoteRequest) -> MoltcheckResult<()> {
        self.votes.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn vote_comment(
        &self,
        comment_id: &str,
        direction: VoteDirection,
    ) -> MoltcheckResult<()> {
        self.comment_votes
            .lock()
            .unwrap()
            .push((comment_id.to_string(), direction));
        Ok(())
    }

    async fn get_profile(&self) -> MoltcheckResult<AgentProfile> {
        Ok(AgentProfile {
            id: "agent-1".into(),
            username: self.username.clone(),
            description: None,
            karma: 0,
            created_at: None,
        })
    }

    async fn fetch_heartbeat(&self) -> MoltcheckResult<String> {
        Ok("# heartbeat".into())
    }

    async fn close(&self) -> MoltcheckResult<()> {
        Ok(())
    }
}
