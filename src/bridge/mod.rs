//! Monitoring bridge contract
//!
//! An optional secondary surface exposing hub entities to third-party
//! tooling. The hub registers every entity under a [`BridgeName`] and treats
//! every bridge failure as non-fatal: it is logged, and the entity stays
//! tracked by the hub.

mod memory;
mod name;

pub use memory::InMemoryBridge;
pub use name::{BridgeCategory, BridgeName, ServiceNameTracker};

use crate::commanding::CommandQueueInfo;
use crate::error::BridgeError;
use crate::link::LinkInfo;
use crate::processor::ProcessorInfo;
use crate::session::ClientInfo;

/// What is exposed under a bridge name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEntity {
    Service(String),
    Link(LinkInfo),
    Processor(ProcessorInfo),
    Client(ClientInfo),
    CommandQueue(CommandQueueInfo),
    Table { database: String, table: String },
    Stream { database: String, stream: String },
}

/// Registration contract of the monitoring bridge
pub trait MonitoringBridge: Send + Sync {
    fn register(&self, name: &BridgeName, entity: BridgeEntity) -> Result<(), BridgeError>;

    fn unregister(&self, name: &BridgeName) -> Result<(), BridgeError>;
}
