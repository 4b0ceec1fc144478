//! Per-session record kept by the session registry

use std::sync::Arc;

use super::context::ClientInfo;
use crate::error::ProcessorError;
use crate::processor::Processor;

/// Connected consumer as implemented by the session layer
pub trait SessionClient: Send + Sync {
    /// Principal owning the session
    fn username(&self) -> &str;

    /// Application name reported at connection time
    fn application_name(&self) -> &str;

    /// Move the client's data subscriptions onto `processor`
    fn switch_processor(&self, processor: &Arc<dyn Processor>) -> Result<(), ProcessorError>;
}

/// Registry entry for one session
pub struct SessionRecord {
    /// Unique session ID
    pub id: u32,

    /// Currently attached processor
    pub processor: Arc<dyn Processor>,

    /// Session layer handle
    pub client: Arc<dyn SessionClient>,
}

impl SessionRecord {
    /// Create a record attached to `processor`
    pub fn new(id: u32, processor: Arc<dyn Processor>, client: Arc<dyn SessionClient>) -> Self {
        Self {
            id,
            processor,
            client,
        }
    }

    /// Snapshot the session
    pub fn info(&self) -> ClientInfo {
        let key = self.processor.key();
        ClientInfo {
            id: self.id,
            instance: key.instance.clone(),
            username: self.client.username().to_string(),
            application: self.client.application_name().to_string(),
            processor_name: key.name.clone(),
        }
    }

    /// Check if the session belongs to `principal`
    pub fn is_owned_by(&self, principal: &str) -> bool {
        self.client.username() == principal
    }
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("id", &self.id)
            .field("processor", self.processor.key())
            .field("username", &self.client.username())
            .finish()
    }
}
