use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

/// Pause between export phases.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Returns immediately and remembers every requested pause.
#[derive(Clone, Debug, Default)]
pub struct RecordingDelay {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    pub fn waits(&self) -> Vec<Duration> {
        match self.waits.lock() {
            Ok(waits) => waits.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        match self.waits.lock() {
            Ok(mut waits) => waits.push(duration),
            Err(poisoned) => poisoned.into_inner().push(duration),
        }
    }
}
