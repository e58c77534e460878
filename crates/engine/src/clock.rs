#![forbid(unsafe_code)]

use std::time::{Duration, Instant, SystemTime};

/// Time source for the engine. Cooldowns and timer deadlines use the
/// monotonic side; published timestamps use the wall-clock side. Tests
/// substitute a manual implementation.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn now_system(&self) -> SystemTime;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_system(&self) -> SystemTime {
        SystemTime::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
