//! Command queues
//!
//! Each processor with a command path has one [`CommandQueueManager`]
//! owning its named queues. Managers keep their own per-queue subscriber
//! lists; the hub only tells them which [`CommandQueueListener`]s to add or
//! drop.

use std::sync::Arc;

use crate::listener::CommandQueueListener;

/// Gating state of a command queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueState {
    /// Commands pass through
    Enabled,
    /// Commands wait for manual release
    Blocked,
    /// Commands are rejected
    Disabled,
}

/// Point-in-time copy of a command queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandQueueInfo {
    pub instance: String,
    pub processor_name: String,
    pub name: String,
    pub state: QueueState,
    /// Commands currently held in the queue
    pub pending: usize,
}

/// A command held in or released from a queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedCommandInfo {
    pub instance: String,
    pub processor_name: String,
    pub queue_name: String,
    /// Command identifier (origin + sequence)
    pub command_id: String,
    /// Principal that issued the command
    pub username: String,
}

/// Owner of the command queues of one processor
pub trait CommandQueueManager: Send + Sync {
    fn instance(&self) -> &str;

    /// Name of the processor the queues belong to
    fn processor_name(&self) -> &str;

    /// Snapshot of every queue, in manager order
    fn queues(&self) -> Vec<CommandQueueInfo>;

    /// Subscribe a listener to every queue of this manager
    ///
    /// Registering a listener that is already subscribed must be a no-op.
    fn register_listener(&self, listener: Arc<dyn CommandQueueListener>);

    /// Drop a listener from every queue of this manager
    fn remove_listener(&self, listener: &Arc<dyn CommandQueueListener>) -> bool;
}
