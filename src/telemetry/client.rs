use opentelemetry_proto::tonic::collector::metrics::v1::metrics_service_client::MetricsServiceClient;
use opentelemetry_proto::tonic::resource::v1::Resource;
use tonic::transport::{Channel, Endpoint};

use super::otlp;
use crate::config::Config;
use crate::status::ContainerStatus;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid OTLP endpoint: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// OTLP/gRPC push client for container status gauges.
///
/// Constructed once at startup and passed down; dropping it after the last
/// tick releases the channel, there is no buffered state to flush.
pub struct MetricsExporter {
    client: MetricsServiceClient<Channel>,
    resource: Resource,
    prefix: String,
}

impl MetricsExporter {
    /// Builds the exporter against the configured collector endpoint. The
    /// channel connects lazily on first export; only a malformed endpoint
    /// fails construction.
    pub fn connect(config: &Config) -> Result<Self, TelemetryError> {
        let channel = Endpoint::from_shared(config.otlp_endpoint.clone())?.connect_lazy();
        Ok(Self {
            client: MetricsServiceClient::new(channel),
            resource: otlp::service_resource(&config.service_name, &config.service_namespace),
            prefix: config.metric_prefix.clone(),
        })
    }

    /// Records one data point per instrument per record. Fire-and-forget:
    /// export failures are logged and never bubble up to the scheduler.
    pub async fn send(&mut self, records: &[ContainerStatus]) {
        if records.is_empty() {
            return;
        }
        let request = otlp::build_export_request(
            self.resource.clone(),
            &self.prefix,
            records,
            unix_nano_now(),
        );
        match self.client.export(request).await {
            Ok(response) => {
                if let Some(partial) = response.into_inner().partial_success {
                    if partial.rejected_data_points > 0 {
                        log::warn!(
                            "OTLP backend rejected {} data points: {}",
                            partial.rejected_data_points,
                            partial.error_message
                        );
                    }
                }
                log::debug!("Exported {} container status records", records.len());
            }
            Err(status) => {
                log::error!("Failed to export container metrics: {status}");
            }
        }
    }
}

fn unix_nano_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
