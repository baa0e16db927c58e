// Randomised stand-in for the robot's telemetry endpoint

use rand::Rng;
use std::time::Duration;
use tracing::instrument;

use super::TelemetrySource;
use crate::error::SourceError;
use crate::models::TelemetrySnapshot;

#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Simulated network latency before each snapshot.
    pub delay: Duration,
    /// Probability in 0..=1 that a call fails instead of returning data.
    pub failure_rate: f64,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            failure_rate: 0.0,
        }
    }
}

/// Every field is resampled independently on each call.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    config: MockSourceConfig,
}

impl MockSource {
    pub fn new(config: MockSourceConfig) -> Self {
        Self { config }
    }

    /// Draw one snapshot. Ranges: speed [0,10), battery [0,100), current
    /// [0,30), weight [0,100), temperature [0,50); obstacle 30%, gas 10%,
    /// lifting 50%.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> TelemetrySnapshot {
        TelemetrySnapshot {
            speed: rng.gen_range(0.0..10.0),
            battery: rng.gen_range(0.0..100.0),
            current: rng.gen_range(0.0..30.0),
            weight: rng.gen_range(0.0..100.0),
            obstacle_detected: rng.gen_bool(0.3),
            temperature: rng.gen_range(0.0..50.0),
            gas_detected: rng.gen_bool(0.1),
            lifting_status: rng.gen_bool(0.5),
        }
    }
}

impl TelemetrySource for MockSource {
    #[instrument(skip(self), fields(source = "mock", operation = "fetch_snapshot"))]
    async fn fetch_snapshot(&self) -> Result<TelemetrySnapshot, SourceError> {
        tokio::time::sleep(self.config.delay).await;
        // ThreadRng is !Send; keep it out of any await.
        let mut rng = rand::thread_rng();
        if self.config.failure_rate > 0.0 && rng.gen_bool(self.config.failure_rate.min(1.0)) {
            return Err(SourceError::Unavailable("simulated link drop".into()));
        }
        Ok(Self::sample(&mut rng))
    }
}
