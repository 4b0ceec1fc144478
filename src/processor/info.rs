//! Processor snapshot

use super::{Processor, ProcessorState};

/// Point-in-time copy of a processor's attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorInfo {
    pub instance: String,
    pub name: String,
    pub processor_type: String,
    pub creator: String,
    pub persistent: bool,
    pub replay: bool,
    pub state: ProcessorState,
    /// Sessions attached at snapshot time
    pub connected_clients: usize,
}

impl ProcessorInfo {
    /// Snapshot a processor with a known session count
    pub fn capture(processor: &dyn Processor, connected_clients: usize) -> Self {
        let key = processor.key();
        Self {
            instance: key.instance.clone(),
            name: key.name.clone(),
            processor_type: processor.processor_type().to_string(),
            creator: processor.creator().to_string(),
            persistent: processor.is_persistent(),
            replay: processor.is_replay(),
            state: processor.state(),
            connected_clients,
        }
    }
}
