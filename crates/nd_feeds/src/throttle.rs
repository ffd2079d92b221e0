use nd_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Paces outbound calls: at most `max_in_flight` at once, and consecutive
/// permits handed out at least `spacing` apart. The first permit is immediate.
#[derive(Debug, Clone)]
pub struct Throttle {
    permits: Arc<Semaphore>,
    spacing: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

/// Held for the duration of one throttled call.
#[derive(Debug)]
pub struct ThrottlePermit {
    _permit: OwnedSemaphorePermit,
}

impl Throttle {
    pub fn new(max_in_flight: usize, spacing: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            spacing,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// No spacing and effectively no concurrency bound; for tests and local runs.
    pub fn unlimited() -> Self {
        Self::new(Semaphore::MAX_PERMITS, Duration::ZERO)
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    pub async fn acquire(&self) -> Result<ThrottlePermit> {
        let permit = self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| Error::External(anyhow::anyhow!("throttle closed: {}", e)))?;

        let slot = {
            let mut next_slot = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next_slot {
                Some(at) if at > now => at,
                _ => now,
            };
            *next_slot = Some(slot + self.spacing);
            slot
        };
        tokio::time::sleep_until(slot).await;

        Ok(ThrottlePermit { _permit: permit })
    }

    /// Runs `fut` while holding a permit.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = T>,
    {
        let _permit = self.acquire().await?;
        Ok(fut.await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_permits_are_spaced() {
        let throttle = Throttle::new(1, Duration::from_secs(2));
        let start = Instant::now();

        drop(throttle.acquire().await.unwrap());
        assert_eq!(start.elapsed(), Duration::ZERO);

        drop(throttle.acquire().await.unwrap());
        assert_eq!(start.elapsed(), Duration::from_secs(2));

        drop(throttle.acquire().await.unwrap());
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_time_counts_toward_spacing() {
        let throttle = Throttle::new(1, Duration::from_secs(2));
        drop(throttle.acquire().await.unwrap());

        tokio::time::sleep(Duration::from_secs(5)).await;
        let before = Instant::now();
        drop(throttle.acquire().await.unwrap());
        assert_eq!(before.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounds_concurrency() {
        let throttle = Throttle::new(2, Duration::ZERO);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..6)
            .map(|_| {
                let throttle = throttle.clone();
                let active = active.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    let _permit = throttle.acquire().await.unwrap();
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_returns_output() {
        let throttle = Throttle::unlimited();
        assert_eq!(throttle.run(async { 7 }).await.unwrap(), 7);
    }
}
