//! Events delivered to subscribers

use crate::commanding::{CommandQueueInfo, QueuedCommandInfo};
use crate::link::LinkInfo;
use crate::processor::ProcessorInfo;
use crate::session::ClientInfo;
use crate::stats::StatisticsSnapshot;

/// Processor and session changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagementEvent {
    ProcessorAdded(ProcessorInfo),
    ProcessorClosed(ProcessorInfo),
    ProcessorStateChanged(ProcessorInfo),
    SessionRegistered(ClientInfo),
    SessionUnregistered(ClientInfo),
    /// Session attributes changed (e.g., switched processor)
    SessionInfoChanged(ClientInfo),
    StatisticsUpdated(StatisticsSnapshot),
}

impl ManagementEvent {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ManagementEvent::ProcessorAdded(_) => "processor_added",
            ManagementEvent::ProcessorClosed(_) => "processor_closed",
            ManagementEvent::ProcessorStateChanged(_) => "processor_state_changed",
            ManagementEvent::SessionRegistered(_) => "session_registered",
            ManagementEvent::SessionUnregistered(_) => "session_unregistered",
            ManagementEvent::SessionInfoChanged(_) => "session_info_changed",
            ManagementEvent::StatisticsUpdated(_) => "statistics_updated",
        }
    }
}

/// Link registration and health changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Registered(LinkInfo),
    Unregistered { instance: String, name: String },
    Changed(LinkInfo),
}

/// Command queue changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// Queue state or content changed
    QueueUpdated(CommandQueueInfo),
    CommandAdded(QueuedCommandInfo),
    CommandUpdated(QueuedCommandInfo),
    CommandRejected(QueuedCommandInfo),
    CommandSent(QueuedCommandInfo),
}
