//! Prometheus registry and the counters exposed at `/metrics`.

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

pub struct ApiMetrics {
    registry: Registry,
    pub copilot_requests: IntCounter,
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let copilot_requests = IntCounter::new(
            "pulse_copilot_requests_total",
            "Prompts answered by the insight engine",
        )
        .expect("counter definition is valid");
        registry
            .register(Box::new(copilot_requests.clone()))
            .expect("counter registers once");
        Self {
            registry,
            copilot_requests,
        }
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
