use crate::errors::{MoltcheckError, MoltcheckResult};
use crate::models::moltbook::{
    AgentProfile, ApiEnvelope, Comment, CommentSortOrder, CreateCommentRequest,
    CreatePostRequest, Post, PostSortOrder, VoteDirection, VoteRequest,
};
use crate::utils::rate_limit::RateLimiter;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const HEARTBEAT_URL: &str = "https://www.moltbook.com/heartbeat.md";
const MAX_RETRIES: usize = 3;
const INITIAL_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 10_000;

/// Moltbook forum API operations the agent depends on. One concrete HTTP
/// implementation; test doubles substitute freely.
#[async_trait]
pub trait MoltbookApi: Send + Sync {
    async fn get_posts(
        &self,
        sort: PostSortOrder,
        submolt: Option<&str>,
    ) -> MoltcheckResult<Vec<Post>>;
    async fn get_feed(&self, sort: PostSortOrder, limit: u32) -> MoltcheckResult<Vec<Post>>;
    async fn get_post(&self, post_id: &str) -> MoltcheckResult<Post>;
    async fn create_post(&self, request: &CreatePostRequest) -> MoltcheckResult<Post>;
    async fn delete_post(&self, post_id: &str) -> MoltcheckResult<()>;

    async fn get_comments(
        &self,
        post_id: &str,
        sort: CommentSortOrder,
    ) -> MoltcheckResult<Vec<Comment>>;
    async fn create_comment(&self, request: &CreateCommentRequest) -> MoltcheckResult<Comment>;

    async fn vote(&self, request: &VoteRequest) -> MoltcheckResult<()>;
    async fn vote_comment(
        &self,
        comment_id: &str,
        direction: VoteDirection,
    ) -> MoltcheckResult<()>;

    async fn get_profile(&self) -> MoltcheckResult<AgentProfile>;
    async fn fetch_heartbeat(&self) -> MoltcheckResult<String>;
    async fn close(&self) -> MoltcheckResult<()>;
}

/// HTTP client for the Moltbook REST API.
///
/// Every request passes through the process-wide sliding-window rate
/// limiter before hitting the wire, and transient failures (5xx, transport
/// errors) are retried with exponential backoff and jitter.
pub struct MoltbookClient {
    client: reqwest::Client,
    base_url: String,
    base_host: Option<String>,
    api_key: String,
    rate_limiter: Arc<RateLimiter>,
}

impl MoltbookClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base_host = reqwest::Url::parse(&base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url,
            base_host,
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::new(90, Duration::from_secs(60))),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = limiter;
        self
    }

    /// Credentials only ever go to the configured base host.
    fn validate_url(&self, url: &str) -> MoltcheckResult<()> {
        let host = reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        if host.is_some() && host == self.base_host {
            return Ok(());
        }
        Err(MoltcheckError::Api {
            message: format!("refusing to send API key to untrusted host: {}", url),
            hint: None,
            retryable: false,
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> MoltcheckResult<T> {
        let url = format!("{}{}", self.base_url, path);
        self.validate_url(&url)?;

        let mut last_error: Option<MoltcheckError> = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let base = (INITIAL_DELAY_MS as f64 * 2f64.powi(attempt as i32 - 1))
                    .min(MAX_DELAY_MS as f64) as u64;
                let jitter = (base as f64 * 0.25 * fastrand::f64()) as u64;
                warn!(
                    attempt,
                    path,
                    "retrying API request after error: {}",
                    last_error
                        .as_ref()
                        .map(|e| e.to_string())
                        .unwrap_or_default()
                );
                tokio::time::sleep(Duration::from_millis(base + jitter)).await;
            }

            self.rate_limiter.acquire().await;

            let mut req = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(&self.api_key);
            if let Some(body) = &body {
                req = req.json(body);
            }

            let result = async {
                let resp = req.send().await.map_err(|e| MoltcheckError::Api {
                    message: format!("transport error: {}", e),
                    hint: None,
                    retryable: true,
                })?;

                let status = resp.status();
                if !status.is_success() {
                    let text = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "unknown error".to_string());
                    return Err(MoltcheckError::Api {
                        message: format!("HTTP {} on {}: {}", status.as_u16(), path, text),
                        hint: None,
                        retryable: status.is_server_error(),
                    });
                }

                let envelope: ApiEnvelope<T> =
                    resp.json().await.map_err(|e| MoltcheckError::Api {
                        message: format!("failed to parse response for {}: {}", path, e),
                        hint: None,
                        retryable: false,
                    })?;
                envelope.into_data()
            }
            .await;

            match result {
                Ok(data) => {
                    debug!(%method, path, "API request ok");
                    return Ok(data);
                }
                Err(err) if err.is_retryable() && attempt < MAX_RETRIES => {
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error
            .unwrap_or_else(|| MoltcheckError::Internal(anyhow::anyhow!("all retries failed"))))
    }
}

#[async_trait]
impl MoltbookApi for MoltbookClient {
    async fn get_posts(
        &self,
        sort: PostSortOrder,
        submolt: Option<&str>,
    ) -> MoltcheckResult<Vec<Post>> {
        let mut path = format!("/posts?sort={}", sort.as_str());
        if let Some(submolt) = submolt {
            path.push_str(&format!("&submolt={}", submolt));
        }
        self.request(reqwest::Method::GET, &path, None).await
    }

    async fn get_feed(&self, sort: PostSortOrder, limit: u32) -> MoltcheckResult<Vec<Post>> {
        let path = format!("/feed?sort={}&limit={}", sort.as_str(), limit);
        self.request(reqwest::Method::GET, &path, None).await
    }

    async fn get_post(&self, post_id: &str) -> MoltcheckResult<Post> {
        self.request(reqwest::Method::GET, &format!("/posts/{}", post_id), None)
            .await
    }

    async fn create_post(&self, request: &CreatePostRequest) -> MoltcheckResult<Post> {
        request.validate()?;
        let post: Post = self
            .request(
                reqwest::Method::POST,
                "/posts",
                Some(serde_json::to_value(request).map_err(anyhow::Error::from)?),
            )
            .await?;
        info!(submolt = %request.submolt, post_id = %post.id, "post published");
        Ok(post)
    }

    async fn delete_post(&self, post_id: &str) -> MoltcheckResult<()> {
        let _: serde_json::Value = self
            .request(
                reqwest::Method::DELETE,
                &format!("/posts/{}", post_id),
                None,
            )
            .await?;
        Ok(())
    }

    async fn get_comments(
        &self,
        post_id: &str,
        sort: CommentSortOrder,
    ) -> MoltcheckResult<Vec<Comment>> {
        let path = format!("/posts/{}/comments?sort={}", post_id, sort.as_str());
        self.request(reqwest::Method::GET, &path, None).await
    }

    async fn create_comment(&self, request: &CreateCommentRequest) -> MoltcheckResult<Comment> {
        request.validate()?;
        let comment: Comment = self
            .request(
                reqwest::Method::POST,
                "/comments",
                Some(serde_json::to_value(request).map_err(anyhow::Error::from)?),
            )
            .await?;
        info!(post_id = %request.post_id, "comment published");
        Ok(comment)
    }

    async fn vote(&self, request: &VoteRequest) -> MoltcheckResult<()> {
        let _: serde_json::Value = self
            .request(
                reqwest::Method::POST,
                "/vote",
                Some(serde_json::to_value(request).map_err(anyhow::Error::from)?),
            )
            .await?;
        Ok(())
    }

    async fn vote_comment(
        &self,
        comment_id: &str,
        direction: VoteDirection,
    ) -> MoltcheckResult<()> {
        let _: serde_json::Value = self
            .request(
                reqwest::Method::POST,
                &format!("/comments/{}/vote", comment_id),
                Some(json!({"direction": direction.as_str()})),
            )
            .await?;
        Ok(())
    }

    async fn get_profile(&self) -> MoltcheckResult<AgentProfile> {
        self.request(reqwest::Method::GET, "/agents/me", None).await
    }

    /// The heartbeat document is public; fetched without credentials.
    async fn fetch_heartbeat(&self) -> MoltcheckResult<String> {
        self.rate_limiter.acquire().await;
        let resp = self
            .client
            .get(HEARTBEAT_URL)
            .timeout(Duration::from_secs(15))
            .send()
            .await
            .map_err(|e| MoltcheckError::Api {
                message: format!("heartbeat fetch failed: {}", e),
                hint: None,
                retryable: true,
            })?;
        if !resp.status().is_success() {
            return Err(MoltcheckError::Api {
                message: format!("heartbeat fetch returned HTTP {}", resp.status().as_u16()),
                hint: None,
                retryable: false,
            });
        }
        resp.text().await.map_err(|e| MoltcheckError::Api {
            message: format!("heartbeat body read failed: {}", e),
            hint: None,
            retryable: false,
        })
    }

    async fn close(&self) -> MoltcheckResult<()> {
        // reqwest clients close their pools on drop; nothing to flush.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_url_accepts_base_host() {
        let client = MoltbookClient::new("https://www.moltbook.com/api/v1", "key");
        assert!(client
            .validate_url("https://www.moltbook.com/api/v1/posts")
            .is_ok());
    }

    #[test]
    fn validate_url_rejects_other_hosts() {
        let client = MoltbookClient::new("https://www.moltbook.com/api/v1", "key");
        assert!(client.validate_url("https://evil.example.com/posts").is_err());
    }
}
