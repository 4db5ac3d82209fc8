use crate::errors::MoltcheckResult;
use crate::models::actions::{ActionEntry, ActionType, AgentState};
use crate::utils::{atomic_write, ensure_dir};
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::info;

/// Durable agent state persistence.
///
/// The seen-post and replied-comment sets are the core idempotency guarantee
/// of the whole system: once an id is marked, it stays marked for the life of
/// the store, across restarts and overlapping cycles.
#[async_trait]
pub trait StateRepository: Send + Sync {
    async fn initialize(&self) -> MoltcheckResult<()>;

    async fn load_state(&self) -> MoltcheckResult<AgentState>;
    async fn save_state(&self, state: &AgentState) -> MoltcheckResult<()>;

    async fn mark_post_seen(&self, post_id: &str) -> MoltcheckResult<()>;
    async fn is_post_seen(&self, post_id: &str) -> bool;

    async fn mark_comment_replied(&self, comment_id: &str) -> MoltcheckResult<()>;
    async fn is_comment_replied(&self, comment_id: &str) -> bool;

    async fn log_action(&self, entry: ActionEntry) -> MoltcheckResult<()>;
    async fn get_today_action_count(&self, action_type: ActionType) -> MoltcheckResult<u32>;
    async fn get_action_target_ids(&self, action_type: ActionType)
        -> MoltcheckResult<Vec<String>>;

    async fn close(&self) -> MoltcheckResult<()>;
}

/// File-based state persistence over a data directory:
/// - `state.json` — current snapshot, atomically overwritten each save
/// - `actions.jsonl` — append-only action log, one JSON object per line
/// - `seen_posts.json` / `replied_comments.json` — id sets, atomically
///   overwritten on each mark
///
/// The id sets are mirrored in memory for fast lookup. Mutations follow
/// write-ahead discipline: the file write happens before the in-memory set
/// is considered updated, all under a single mutex per read-modify-write.
pub struct FileStateRepository {
    data_dir: PathBuf,
    state_path: PathBuf,
    actions_path: PathBuf,
    seen_path: PathBuf,
    replied_path: PathBuf,
    inner: Mutex<Indices>,
}

#[derive(Default)]
struct Indices {
    seen_ids: HashSet<String>,
    replied_ids: HashSet<String>,
}

impl FileStateRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            state_path: data_dir.join("state.json"),
            actions_path: data_dir.join("actions.jsonl"),
            seen_path: data_dir.join("seen_posts.json"),
            replied_path: data_dir.join("replied_comments.json"),
            data_dir,
            inner: Mutex::new(Indices::default()),
        }
    }

    fn load_id_set(path: &PathBuf) -> MoltcheckResult<HashSet<String>> {
        if !path.exists() {
            return Ok(HashSet::new());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<String> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(ids.into_iter().collect())
    }

    fn write_id_set(path: &PathBuf, ids: &HashSet<String>) -> MoltcheckResult<()> {
        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();
        let content = serde_json::to_string(&sorted).context("Failed to serialize id set")?;
        atomic_write(path, &content)?;
        Ok(())
    }

    fn read_log_entries(&self) -> MoltcheckResult<Vec<ActionEntry>> {
        if !self.actions_path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.actions_path)
            .with_context(|| format!("Failed to read {}", self.actions_path.display()))?;
        let mut entries = Vec::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let entry: ActionEntry =
                serde_json::from_str(line).context("Failed to parse action log line")?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

#[async_trait]
impl StateRepository for FileStateRepository {
    async fn initialize(&self) -> MoltcheckResult<()> {
        ensure_dir(&self.data_dir)?;

        let mut inner = self.inner.lock().await;
        inner.seen_ids = Self::load_id_set(&self.seen_path)?;
        inner.replied_ids = Self::load_id_set(&self.replied_path)?;

        if !self.actions_path.exists() {
            std::fs::File::create(&self.actions_path)
                .with_context(|| format!("Failed to create {}", self.actions_path.display()))?;
        }

        info!(
            data_dir = %self.data_dir.display(),
            seen = inner.seen_ids.len(),
            replied = inner.replied_ids.len(),
            "file state repository initialized"
        );
        Ok(())
    }

    async fn load_state(&self) -> MoltcheckResult<AgentState> {
        let inner = self.inner.lock().await;
        let mut state = if self.state_path.exists() {
            let raw = std::fs::read_to_string(&self.state_path)
                .with_context(|| format!("Failed to read {}", self.state_path.display()))?;
            if raw.trim().is_empty() {
                AgentState::default()
            } else {
                serde_json::from_str(&raw).context("Failed to parse state.json")?
            }
        } else {
            AgentState::default()
        };
        // The durable seen-set file is authoritative over the snapshot copy.
        state.seen_post_ids = inner.seen_ids.clone();
        Ok(state)
    }

    async fn save_state(&self, state: &AgentState) -> MoltcheckResult<()> {
        let _inner = self.inner.lock().await;
        // Seen ids live in their own file; keep the snapshot light.
        let mut stripped = state.clone();
        stripped.seen_post_ids.clear();
        let content =
            serde_json::to_string_pretty(&stripped).context("Failed to serialize state")?;
        atomic_write(&self.state_path, &content)?;
        Ok(())
    }

    async fn mark_post_seen(&self, post_id: &str) -> MoltcheckResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.seen_ids.contains(post_id) {
            return Ok(());
        }
        let mut next = inner.seen_ids.clone();
        next.insert(post_id.to_string());
        Self::write_id_set(&self.seen_path, &next)?;
        inner.seen_ids = next;
        Ok(())
    }

    async fn is_post_seen(&self, post_id: &str) -> bool {
        self.inner.lock().await.seen_ids.contains(post_id)
    }

    async fn mark_comment_replied(&self, comment_id: &str) -> MoltcheckResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.replied_ids.contains(comment_id) {
            return Ok(());
        }
        let mut next = inner.replied_ids.clone();
        next.insert(comment_id.to_string());
        Self::write_id_set(&self.replied_path, &next)?;
        inner.replied_ids = next;
        Ok(())
    }

    async fn is_comment_replied(&self, comment_id: &str) -> bool {
        self.inner.lock().await.replied_ids.contains(comment_id)
    }

    async fn log_action(&self, entry: ActionEntry) -> MoltcheckResult<()> {
        let _inner = self.inner.lock().await;
        let line = serde_json::to_string(&entry).context("Failed to serialize action entry")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.actions_path)
            .with_context(|| format!("Failed to open {}", self.actions_path.display()))?;
        writeln!(file, "{}", line).context("Failed to append action entry")?;
        file.sync_all().context("Failed to sync action log")?;
        Ok(())
    }

    async fn get_today_action_count(&self, action_type: ActionType) -> MoltcheckResult<u32> {
        let _inner = self.inner.lock().await;
        // Calendar-day semantics: UTC date match, no rolling window.
        let today = Utc::now().date_naive();
        let count = self
            .read_log_entries()?
            .iter()
            .filter(|e| e.action_type == action_type && e.created_at.date_naive() == today)
            .count();
        Ok(count as u32)
    }

    async fn get_action_target_ids(
        &self,
        action_type: ActionType,
    ) -> MoltcheckResult<Vec<String>> {
        let _inner = self.inner.lock().await;
        Ok(self
            .read_log_entries()?
            .into_iter()
            .filter(|e| e.action_type == action_type)
            .filter_map(|e| e.target_id)
            .collect())
    }

    async fn close(&self) -> MoltcheckResult<()> {
        info!("file state repository closed");
        Ok(())
    }
}
