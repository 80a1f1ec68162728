//! Per-tick status collection: concurrent fan-out over all containers,
//! aggregated behind a join barrier.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future;

use crate::runtime::{ContainerRuntime, RuntimeError};

mod record;

pub use record::ContainerStatus;

#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("failed to query host info: {0}")]
    HostInfo(#[source] RuntimeError),
    #[error("failed to list containers: {0}")]
    List(#[source] RuntimeError),
    #[error("failed to inspect container {id}: {source}")]
    Inspect {
        id: String,
        #[source]
        source: RuntimeError,
    },
    #[error("failed to get container stats for {id}: {source}")]
    Stats {
        id: String,
        #[source]
        source: RuntimeError,
    },
    #[error("container task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct StatusCollector<R> {
    runtime: Arc<R>,
}

impl<R: ContainerRuntime> StatusCollector<R> {
    pub fn new(runtime: R) -> Self {
        Self {
            runtime: Arc::new(runtime),
        }
    }

    /// Produces the current snapshot: one status record per container.
    ///
    /// Any failure in the fan-out fails the whole call; partial results are
    /// discarded. Every spawned task finishes before this returns, even when
    /// an earlier one has already failed, so no task outlives the tick.
    pub async fn collect(&self) -> Result<Vec<ContainerStatus>, CollectError> {
        let capacity = self
            .runtime
            .host_info()
            .await
            .map_err(CollectError::HostInfo)?;
        let containers = self
            .runtime
            .list_containers()
            .await
            .map_err(CollectError::List)?;
        let now = Utc::now();

        let tasks: Vec<_> = containers
            .into_iter()
            .map(|container| {
                let runtime = Arc::clone(&self.runtime);
                tokio::spawn(async move {
                    let detail =
                        runtime
                            .inspect(&container.id)
                            .await
                            .map_err(|source| CollectError::Inspect {
                                id: container.id.clone(),
                                source,
                            })?;
                    let stats =
                        runtime
                            .stats(&container.id)
                            .await
                            .map_err(|source| CollectError::Stats {
                                id: container.id.clone(),
                                source,
                            })?;
                    Ok(ContainerStatus::from_parts(
                        &container, &detail, &stats, &capacity, now,
                    ))
                })
            })
            .collect();

        // Join barrier: drain every task before deciding success or failure.
        let mut records = Vec::with_capacity(tasks.len());
        let mut first_error = None;
        for outcome in future::join_all(tasks).await {
            match outcome {
                Ok(Ok(record)) => records.push(record),
                Ok(Err(err)) => {
                    let _ = first_error.get_or_insert(err);
                }
                Err(join_err) => {
                    let _ = first_error.get_or_insert(CollectError::Task(join_err));
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(records),
        }
    }
}
