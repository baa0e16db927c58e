// Mock source: ranges, latency, failure injection

use kinetika::error::SourceError;
use kinetika::source::{MockSource, MockSourceConfig, TelemetrySource};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::{Duration, Instant};

#[test]
fn samples_stay_within_declared_ranges() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let s = MockSource::sample(&mut rng);
        assert!(s.validate().is_ok());
        assert!((0.0..10.0).contains(&s.speed));
        assert!((0.0..100.0).contains(&s.battery));
        assert!((0.0..30.0).contains(&s.current));
        assert!((0.0..100.0).contains(&s.weight));
        assert!((0.0..50.0).contains(&s.temperature));
    }
}

#[test]
fn flags_are_resampled() {
    let mut rng = StdRng::seed_from_u64(11);
    let samples: Vec<_> = (0..500).map(|_| MockSource::sample(&mut rng)).collect();
    assert!(samples.iter().any(|s| s.obstacle_detected));
    assert!(samples.iter().any(|s| !s.obstacle_detected));
    assert!(samples.iter().any(|s| s.lifting_status));
    assert!(samples.iter().any(|s| !s.lifting_status));
}

#[tokio::test(start_paused = true)]
async fn fetch_waits_configured_delay() {
    let source = MockSource::new(MockSourceConfig {
        delay: Duration::from_millis(500),
        failure_rate: 0.0,
    });
    let started = Instant::now();
    let snapshot = source.fetch_snapshot().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert!(snapshot.validate().is_ok());
}

#[tokio::test(start_paused = true)]
async fn failure_rate_one_always_fails() {
    let source = MockSource::new(MockSourceConfig {
        delay: Duration::ZERO,
        failure_rate: 1.0,
    });
    for _ in 0..5 {
        assert!(matches!(
            source.fetch_snapshot().await,
            Err(SourceError::Unavailable(_))
        ));
    }
}
