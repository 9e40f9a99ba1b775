use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::IngestError;
use crate::types::{ExecutionMode, RuntimeConfig};

pub mod flow_control;

pub use flow_control::{FlowControlConfig, FlowController};

/// Bounded executor for independent tasks.
///
/// In parallel mode every task runs on the tokio runtime, with at most
/// `max_in_flight` tasks alive at once. In sequential mode tasks are awaited
/// one after another on the calling task. Either way results come back in
/// submission order and a panicking task only fails its own slot.
#[derive(Clone)]
pub struct TaskPool {
    mode: ExecutionMode,
    flow: FlowController,
}

impl TaskPool {
    pub fn new(config: &RuntimeConfig) -> Self {
        let flow_config = match config.mode {
            ExecutionMode::Sequential => FlowControlConfig { max_in_flight: 1 },
            ExecutionMode::Parallel => FlowControlConfig::from(config),
        };
        Self {
            mode: config.mode,
            flow: FlowController::new(&flow_config),
        }
    }

    pub fn sequential() -> Self {
        Self::new(&RuntimeConfig::sequential())
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn capacity(&self) -> usize {
        self.flow.capacity()
    }

    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, task: F) -> Vec<Result<R, IngestError>>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        match self.mode {
            ExecutionMode::Sequential => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(guarded(task(item)).await);
                }
                out
            }
            ExecutionMode::Parallel => self.run_parallel(items, task).await,
        }
    }

    async fn run_parallel<T, R, F, Fut>(
        &self,
        items: Vec<T>,
        task: F,
    ) -> Vec<Result<R, IngestError>>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let mut slots: Vec<Option<Result<R, IngestError>>> = Vec::with_capacity(items.len());
        slots.resize_with(items.len(), || None);

        let mut set = JoinSet::new();
        for (idx, item) in items.into_iter().enumerate() {
            let permit = match self.flow.acquire_in_flight().await {
                Ok(permit) => permit,
                Err(e) => {
                    slots[idx] = Some(Err(e));
                    continue;
                }
            };
            let fut = task(item);
            set.spawn(async move {
                let result = guarded(fut).await;
                drop(permit);
                (idx, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(e) => warn!("pool task join failure: {e}"),
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(IngestError::Execution("task did not complete".to_string()))
                })
            })
            .collect()
    }
}

async fn guarded<Fut: Future>(fut: Fut) -> Result<Fut::Output, IngestError> {
    AssertUnwindSafe(fut)
        .catch_unwind()
        .await
        .map_err(|payload| IngestError::Panicked(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
