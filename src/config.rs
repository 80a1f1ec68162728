use std::time::Duration;

const DEFAULT_SERVICE_NAME: &str = "otel-docker-exporter";
const DEFAULT_SERVICE_NAMESPACE: &str = "default";
const DEFAULT_INTERVAL_SECS: u64 = 15;
const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4317";

/// Runtime configuration, sourced from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// `service.name` resource attribute on every exported batch.
    pub service_name: String,
    /// `service.namespace` resource attribute on every exported batch.
    pub service_namespace: String,
    /// Optional prefix, dot-appended to every instrument name when non-empty.
    pub metric_prefix: String,
    pub poll_interval: Duration,
    /// OTLP/gRPC collector endpoint.
    pub otlp_endpoint: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            service_name: env_or("SERVICE_NAME", DEFAULT_SERVICE_NAME),
            service_namespace: env_or("SERVICE_NAMESPACE", DEFAULT_SERVICE_NAMESPACE),
            metric_prefix: std::env::var("METRIC_PREFIX").unwrap_or_default(),
            poll_interval: Duration::from_secs(interval_secs(
                std::env::var("INTERVAL").ok().as_deref(),
            )),
            otlp_endpoint: env_or("OTEL_EXPORTER_OTLP_ENDPOINT", DEFAULT_OTLP_ENDPOINT),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// Unset or unparseable intervals fall back to the default.
fn interval_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_INTERVAL_SECS)
}
