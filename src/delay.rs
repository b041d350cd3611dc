use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::time::Duration;

/// Bounded random pause used for thinking and eating.
pub struct Delay<R: Rng + ?Sized> {
    pub rng: Box<R>,
    pub max: Duration,
}

impl Delay<SmallRng> {
    pub fn new(max: Duration, seed: u64) -> Self {
        Self {
            rng: Box::new(SmallRng::seed_from_u64(seed)),
            max,
        }
    }
}

impl<R: Rng + ?Sized> Delay<R> {
    /// Uniform duration in `[0, max]`.
    pub fn sample(&mut self) -> Duration {
        if self.max.is_zero() {
            return Duration::ZERO;
        }
        let max_nanos = u64::try_from(self.max.as_nanos()).unwrap_or(u64::MAX);
        Duration::from_nanos(self.rng.random_range(0..=max_nanos))
    }

    pub async fn pause(&mut self) {
        let duration = self.sample();
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

#[cfg(test)]
#[path = "delay_tests.rs"]
mod tests;
