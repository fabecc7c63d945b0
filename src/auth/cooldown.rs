use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::debug;

/// Seconds a user must wait before asking for another OTP.
pub const RESEND_COOLDOWN_SECS: u32 = 60;

/// Countdown that blocks OTP resends for a fixed number of seconds.
///
/// Shared between the flow and a ticking task, so state is atomic.
#[derive(Debug, Default)]
pub struct ResendCooldown {
    remaining: AtomicU32,
}

impl ResendCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the countdown at the full duration.
    pub fn start(&self) {
        self.remaining.store(RESEND_COOLDOWN_SECS, Ordering::SeqCst);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.remaining() > 0
    }

    /// Count down one second, saturating at zero. Returns the new value.
    pub fn tick(&self) -> u32 {
        let previous = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |r| r.checked_sub(1))
            .unwrap_or(0);
        previous.saturating_sub(1)
    }

    /// Tick once per second until the countdown reaches zero.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately.
        interval.tick().await;
        while self.is_active() {
            interval.tick().await;
            if self.tick() == 0 {
                debug!("Resend cooldown finished");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_inactive() {
        let cooldown = ResendCooldown::new();
        assert!(!cooldown.is_active());
        assert_eq!(cooldown.tick(), 0);
    }

    #[test]
    fn test_tick_counts_down_to_zero() {
        let cooldown = ResendCooldown::new();
        cooldown.start();
        assert_eq!(cooldown.remaining(), 60);

        for expected in (0..60).rev() {
            assert_eq!(cooldown.tick(), expected);
        }
        assert!(!cooldown.is_active());
        assert_eq!(cooldown.tick(), 0);
    }

    #[test]
    fn test_start_resets() {
        let cooldown = ResendCooldown::new();
        cooldown.start();
        cooldown.tick();
        cooldown.tick();
        cooldown.start();
        assert_eq!(cooldown.remaining(), RESEND_COOLDOWN_SECS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_finishes_after_sixty_seconds() {
        let cooldown = Arc::new(ResendCooldown::new());
        cooldown.start();

        let ticker = {
            let cooldown = Arc::clone(&cooldown);
            tokio::spawn(async move { cooldown.run().await })
        };

        tokio::time::sleep(Duration::from_millis(30_500)).await;
        assert_eq!(cooldown.remaining(), 30);

        tokio::time::sleep(Duration::from_secs(30)).await;
        ticker.await.unwrap();
        assert!(!cooldown.is_active());
    }
}
