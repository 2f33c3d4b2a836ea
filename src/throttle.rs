use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

pub const DEFAULT_PAUSE_PROBABILITY: f64 = 0.25;
pub const DEFAULT_PAUSE_DELAY: Duration = Duration::from_secs(2);

/// Resolves to how long the limiter actually waited.
pub type ThrottleFuture<'a> = Pin<Box<dyn Future<Output = Duration> + Send + 'a>>;

pub trait RateLimiter {
    fn wait_before_next(&mut self) -> ThrottleFuture<'_>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

impl RateLimiter for NoPause {
    fn wait_before_next(&mut self) -> ThrottleFuture<'_> {
        Box::pin(async { Duration::ZERO })
    }
}

/// Sleeps for a fixed delay with a fixed probability before each line.
#[derive(Debug, Clone)]
pub struct RandomPause {
    probability: f64,
    delay: Duration,
    rng: StdRng,
}

impl RandomPause {
    pub fn new(probability: f64, delay: Duration) -> Self {
        Self::with_rng(probability, delay, StdRng::from_entropy())
    }

    pub fn with_rng(probability: f64, delay: Duration, rng: StdRng) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self {
            probability,
            delay,
            rng,
        }
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl RateLimiter for RandomPause {
    fn wait_before_next(&mut self) -> ThrottleFuture<'_> {
        let pause = self.rng.gen_bool(self.probability);
        let delay = self.delay;
        Box::pin(async move {
            if !pause {
                return Duration::ZERO;
            }
            debug!("pausing {:.1}s before next request", delay.as_secs_f32());
            sleep(delay).await;
            delay
        })
    }
}
