//! Docker implementation of [`ContainerRuntime`] using bollard.

use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::{
    InspectContainerOptions, InspectContainerOptionsBuilder, ListContainersOptions,
    ListContainersOptionsBuilder, StatsOptions, StatsOptionsBuilder,
};
use futures_util::StreamExt;

use super::{
    ContainerDetail, ContainerRef, ContainerRuntime, ContainerStats, HostCapacity, RuntimeError,
};

pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connects to Docker using the default connection method
    /// (Unix socket on Linux/macOS, named pipe on Windows).
    pub fn connect() -> Result<Self, RuntimeError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn host_info(&self) -> Result<HostCapacity, RuntimeError> {
        let info = self.docker.info().await?;
        Ok(HostCapacity {
            total_memory_bytes: info.mem_total.unwrap_or_default(),
            cpu_count: info.ncpu.unwrap_or_default(),
        })
    }

    async fn list_containers(&self) -> Result<Vec<ContainerRef>, RuntimeError> {
        let options: ListContainersOptions = ListContainersOptionsBuilder::new().all(true).build();
        let summaries = self.docker.list_containers(Some(options)).await?;
        Ok(summaries
            .into_iter()
            .map(|summary| ContainerRef {
                name: summary
                    .names
                    .as_ref()
                    .and_then(|names| names.first())
                    .cloned()
                    .unwrap_or_default(),
                id: summary.id.unwrap_or_default(),
                image: summary.image.unwrap_or_default(),
            })
            .collect())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDetail, RuntimeError> {
        let options: InspectContainerOptions = InspectContainerOptionsBuilder::new().build();
        let response = self.docker.inspect_container(id, Some(options)).await?;
        let state = response.state.as_ref();
        Ok(ContainerDetail {
            state: state.and_then(|s| s.status).map(|status| status.to_string()),
            health: state
                .and_then(|s| s.health.as_ref())
                .and_then(|h| h.status)
                .map(|status| status.to_string()),
            restart_count: response.restart_count.unwrap_or_default(),
            started_at: state.and_then(|s| s.started_at.clone()),
            labels: response
                .config
                .and_then(|config| config.labels)
                .unwrap_or_default(),
        })
    }

    async fn stats(&self, id: &str) -> Result<ContainerStats, RuntimeError> {
        let options: StatsOptions = StatsOptionsBuilder::new()
            .stream(false)
            .one_shot(true)
            .build();
        let mut stream = self.docker.stats(id, Some(options));
        let sample = stream
            .next()
            .await
            .ok_or_else(|| RuntimeError::MissingStatsSample(id.to_string()))??;
        Ok(ContainerStats {
            memory_usage_bytes: sample
                .memory_stats
                .and_then(|memory| memory.usage)
                .unwrap_or_default(),
            cpu_total_usage_ns: sample
                .cpu_stats
                .and_then(|cpu| cpu.cpu_usage)
                .and_then(|usage| usage.total_usage)
                .unwrap_or_default(),
        })
    }
}
