//! Prometheus registry behind `/metrics`.
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use aranya_core::HerbError;
use aranya_stages::AnalysisObserver;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    stage_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let requests = IntCounterVec::new(
            Opts::new("aranya_requests_total", "HTTP requests by route"),
            &["route"],
        )?;
        let stage_failures = IntCounterVec::new(
            Opts::new("aranya_stage_failures_total", "Failed pipeline runs by error code"),
            &["code"],
        )?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(stage_failures.clone()))?;

        Ok(Self {
            registry,
            requests,
            stage_failures,
        })
    }

    pub fn request(&self, route: &str) {
        self.requests.with_label_values(&[route]).inc();
    }

    pub fn stage_failure(&self, code: &str) {
        self.stage_failures.with_label_values(&[code]).inc();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

impl AnalysisObserver for Metrics {
    fn failed(&self, error: &HerbError) {
        self.stage_failure(error.code());
    }
}
