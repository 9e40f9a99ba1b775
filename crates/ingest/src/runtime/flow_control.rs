use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::IngestError;
use crate::types::RuntimeConfig;

#[derive(Clone)]
pub struct FlowControlConfig {
    pub max_in_flight: usize,
}

impl From<&RuntimeConfig> for FlowControlConfig {
    fn from(value: &RuntimeConfig) -> Self {
        Self {
            max_in_flight: value.max_in_flight,
        }
    }
}

#[derive(Clone)]
pub struct FlowController {
    in_flight: Arc<Semaphore>,
    capacity: usize,
}

impl FlowController {
    pub fn new(config: &FlowControlConfig) -> Self {
        let capacity = config.max_in_flight.max(1);
        Self {
            in_flight: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub async fn acquire_in_flight(&self) -> Result<OwnedSemaphorePermit, IngestError> {
        self.in_flight
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| IngestError::Execution("in-flight flow controller closed".to_string()))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
