use super::*;

#[tokio::test]
async fn acquire_under_limit_does_not_block() {
    let limiter = RateLimiter::new(3, Duration::from_secs(60));
    limiter.acquire().await;
    limiter.acquire().await;
    assert_eq!(limiter.remaining().await, 1);
}

#[tokio::test]
async fn remaining_starts_at_max() {
    let limiter = RateLimiter::new(5, Duration::from_secs(60));
    assert_eq!(limiter.remaining().await, 5);
}

#[tokio::test]
async fn acquire_waits_for_slot_when_window_full() {
    // 2 slots in a 200ms window: the third acquire must wait for expiry.
    let limiter = RateLimiter::new(2, Duration::from_millis(200));
    limiter.acquire().await;
    limiter.acquire().await;
    assert_eq!(limiter.remaining().await, 0);

    let start = Instant::now();
    limiter.acquire().await;
    assert!(
        start.elapsed() >= Duration::from_millis(100),
        "third acquire should have waited, elapsed {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn slots_free_after_window_elapses() {
    let limiter = RateLimiter::new(1, Duration::from_millis(50));
    limiter.acquire().await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(limiter.remaining().await, 1);
}
