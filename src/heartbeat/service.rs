use crate::agent::Agent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::info;

/// Drives the agent on a fixed interval. Exactly one cycle runs at a time:
/// the loop awaits each cycle before sleeping, so cycles can never overlap.
/// Stopping prevents new cycles from starting but never interrupts an
/// in-flight one mid-step — only the inter-cycle sleep is cancelable.
pub struct HeartbeatService {
    agent: Arc<Agent>,
    interval: Duration,
    running: Arc<tokio::sync::Mutex<bool>>,
    wake: Arc<Notify>,
    handle: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl HeartbeatService {
    pub fn new(agent: Arc<Agent>, interval: Duration) -> Self {
        Self {
            agent,
            interval,
            running: Arc::new(tokio::sync::Mutex::new(false)),
            wake: Arc::new(Notify::new()),
            handle: tokio::sync::Mutex::new(None),
        }
    }

    /// Start the scheduler loop. The first cycle runs immediately.
    pub async fn start(&self) {
        *self.running.lock().await = true;
        let running = self.running.clone();
        let wake = self.wake.clone();
        let agent = self.agent.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            loop {
                if !*running.lock().await {
                    break;
                }
                agent.run_cycle().await;

                if !*running.lock().await {
                    break;
                }
                tokio::select! {
                    () = tokio::time::sleep(interval) => {}
                    () = wake.notified() => {}
                }
            }
        });
        *self.handle.lock().await = Some(handle);

        info!(interval_s = self.interval.as_secs(), "heartbeat scheduler started");
    }

    /// Stop scheduling new cycles and wait for the loop to wind down. An
    /// in-flight cycle still runs to its natural completion or abort point.
    pub async fn stop(&self) {
        *self.running.lock().await = false;
        self.wake.notify_waiters();
        if let Some(handle) = self.handle.lock().await.take() {
            let _ = handle.await;
        }
        info!("heartbeat scheduler stopped");
    }
}
