use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Spaces out request starts by at least `delay`.
///
/// A zero delay never sleeps.
pub struct RateLimiter {
    delay: Duration,
    last_executed: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_executed: Mutex::new(None),
        }
    }

    pub async fn lock(&self) {
        if self.delay.is_zero() {
            return;
        }

        let mut last_exec_time = self.last_executed.lock().await;
        if let Some(last) = *last_exec_time {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }

        *last_exec_time = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}
