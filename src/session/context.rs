//! Session snapshot handed to subscribers and the monitoring bridge

use crate::registry::ProcessorKey;

/// Read-only copy of a session's identity and processor association
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientInfo {
    /// Unique session ID
    pub id: u32,

    /// Instance of the attached processor
    pub instance: String,

    /// Principal owning the session
    pub username: String,

    /// Application name reported by the client
    pub application: String,

    /// Name of the attached processor
    pub processor_name: String,
}

impl ClientInfo {
    /// Key of the attached processor
    pub fn processor_key(&self) -> ProcessorKey {
        ProcessorKey::new(&self.instance, &self.processor_name)
    }
}
