use std::sync::{Arc, Mutex};

use thiserror::Error;

use cotiza_core::handoff::ChannelTarget;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("could not open {url}: {reason}")]
    Failed { url: String, reason: String },
}

/// Opens an email or chat deep link on behalf of the advisor.
pub trait ChannelLauncher: Send + Sync {
    fn open(&self, target: &ChannelTarget) -> Result<(), LaunchError>;
}

#[derive(Clone, Debug, Default)]
pub struct RecordingLauncher {
    opened: Arc<Mutex<Vec<ChannelTarget>>>,
}

impl RecordingLauncher {
    pub fn opened(&self) -> Vec<ChannelTarget> {
        match self.opened.lock() {
            Ok(opened) => opened.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ChannelLauncher for RecordingLauncher {
    fn open(&self, target: &ChannelTarget) -> Result<(), LaunchError> {
        match self.opened.lock() {
            Ok(mut opened) => opened.push(target.clone()),
            Err(poisoned) => poisoned.into_inner().push(target.clone()),
        }
        Ok(())
    }
}
