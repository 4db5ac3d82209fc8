use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Sliding-window rate limiter shared across the whole process.
///
/// Bounds outbound Moltbook API requests to `max_requests` per `window`,
/// no matter which component issues the call. When the window is full,
/// `acquire` sleeps until the oldest timestamp ages out instead of failing.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Wait until a request slot is available, then claim it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut stamps = self.timestamps.lock().await;
                let now = Instant::now();
                while let Some(front) = stamps.front() {
                    if now.duration_since(*front) > self.window {
                        stamps.pop_front();
                    } else {
                        break;
                    }
                }

                if stamps.len() < self.max_requests {
                    stamps.push_back(now);
                    return;
                }

                // Oldest entry determines when the next slot frees.
                let oldest = *stamps
                    .front()
                    .expect("window is full, so front must exist");
                self.window
                    .checked_sub(now.duration_since(oldest))
                    .unwrap_or(Duration::ZERO)
            };

            debug!("rate limiter window full, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }

    /// Number of request slots available right now.
    pub async fn remaining(&self) -> usize {
        let stamps = self.timestamps.lock().await;
        let now = Instant::now();
        let active = stamps
            .iter()
            .filter(|t| now.duration_since(**t) <= self.window)
            .count();
        self.max_requests.saturating_sub(active)
    }
}

#[cfg(test)]
mod tests;
