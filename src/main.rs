use anyhow::Result;
use moltcheck::agent::{Agent, AgentBudgets};
use moltcheck::client::{MoltbookApi, MoltbookClient};
use moltcheck::config::Settings;
use moltcheck::heartbeat::HeartbeatService;
use moltcheck::providers::GeminiProvider;
use moltcheck::services::{ContentAnalyzerService, FactCheckerService, PostCreatorService};
use moltcheck::state::{FileStateRepository, StateRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Composition root: the only place that knows about concrete
/// implementations. The agent itself depends only on the collaborator traits.
#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| settings.log_level.parse().unwrap_or_else(|_| "info".parse().unwrap()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(version = moltcheck::VERSION, "moltcheck starting");

    let forum = Arc::new(MoltbookClient::new(
        &settings.moltbook_base_url,
        &settings.moltbook_api_key,
    ));
    let model = Arc::new(GeminiProvider::new(
        &settings.gemini_api_key,
        &settings.gemini_model,
    ));

    let state = Arc::new(FileStateRepository::new(&settings.data_dir));
    state.initialize().await?;

    let agent = Arc::new(Agent::new(
        forum.clone(),
        state.clone(),
        Arc::new(ContentAnalyzerService::new(model.clone())),
        Arc::new(FactCheckerService::new(model.clone())),
        Arc::new(PostCreatorService::new(model)),
        AgentBudgets {
            max_posts_per_day: settings.max_posts_per_day,
            max_comments_per_cycle: settings.max_comments_per_heartbeat,
            max_replies_per_cycle: settings.max_replies_per_heartbeat,
        },
    ));

    let scheduler = HeartbeatService::new(
        agent,
        Duration::from_secs(settings.heartbeat_interval_hours * 3600),
    );
    scheduler.start().await;
    info!(
        interval_hours = settings.heartbeat_interval_hours,
        "moltcheck running"
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    scheduler.stop().await;
    forum.close().await?;
    state.close().await?;
    info!("moltcheck stopped");
    Ok(())
}
