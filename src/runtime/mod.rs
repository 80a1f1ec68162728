//! Capability surface of the container runtime.
//!
//! The collector only ever talks to this trait. The bollard implementation
//! lives in [`docker`]; tests substitute an in-memory runtime.

use std::collections::HashMap;

use async_trait::async_trait;

pub mod docker;

/// Host capacity, queried once per tick and shared read-only by every
/// per-container computation in that tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapacity {
    pub total_memory_bytes: i64,
    pub cpu_count: i64,
}

/// One entry of the container listing. `name` is the first name the runtime
/// reports, untouched (leading slash intact).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: String,
    pub name: String,
    pub image: String,
}

/// Raw inspection data for a single container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDetail {
    pub state: Option<String>,
    /// `None` when the container has no health check configured.
    pub health: Option<String>,
    pub restart_count: i64,
    /// RFC3339 start timestamp as reported by the runtime.
    pub started_at: Option<String>,
    pub labels: HashMap<String, String>,
}

/// A single point-in-time resource sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerStats {
    pub memory_usage_bytes: u64,
    pub cpu_total_usage_ns: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Docker API error: {0}")]
    Api(#[from] bollard::errors::Error),
    #[error("stats stream for container {0} ended without a sample")]
    MissingStatsSample(String),
}

#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    async fn host_info(&self) -> Result<HostCapacity, RuntimeError>;

    /// Lists all containers, including stopped ones.
    async fn list_containers(&self) -> Result<Vec<ContainerRef>, RuntimeError>;

    async fn inspect(&self, id: &str) -> Result<ContainerDetail, RuntimeError>;

    /// One-shot (non-streaming) stats sample.
    async fn stats(&self, id: &str) -> Result<ContainerStats, RuntimeError>;
}
