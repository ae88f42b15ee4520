//! Metrics sink collaborator (§6): `timingDuration(key, duration, sampleRate)`,
//! with a no-op default mirroring the teacher's `Cache`/`NoCache` idiom.

use std::time::Duration;

pub trait Metrics: Send + Sync {
    fn timing_duration(&self, key: &str, duration: Duration, sample_rate: f32);
}

#[derive(Debug, Default)]
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn timing_duration(&self, _key: &str, _duration: Duration, _sample_rate: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_metrics_accepts_any_call() {
        let metrics = NoopMetrics;
        metrics.timing_duration("va.validation.http-01.valid", Duration::from_millis(12), 1.0);
    }
}
