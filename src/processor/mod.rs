//! Processing pipelines as seen by the hub
//!
//! A processor is an instance-scoped pipeline owned by another subsystem.
//! The hub only needs to read its attributes, start or quit it, watch its
//! run state and pull its processing statistics. The [`ProcessorFactory`]
//! builds new pipelines for the creation workflow.

mod info;

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::ProcessorError;
use crate::registry::ProcessorKey;
use crate::stats::ProcessingStatistics;

pub use info::ProcessorInfo;

/// Run state of a processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorState {
    /// Constructed, not started
    New,
    /// Start requested
    Starting,
    /// Processing data
    Running,
    /// Quit requested
    Stopping,
    /// Stopped normally
    Terminated,
    /// Stopped with an error
    Failed,
}

impl ProcessorState {
    /// Whether the processor can no longer reach `Running`
    pub fn is_final(&self) -> bool {
        matches!(self, ProcessorState::Terminated | ProcessorState::Failed)
    }
}

impl std::fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessorState::New => "NEW",
            ProcessorState::Starting => "STARTING",
            ProcessorState::Running => "RUNNING",
            ProcessorState::Stopping => "STOPPING",
            ProcessorState::Terminated => "TERMINATED",
            ProcessorState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// What to do when a replay reaches its stop time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndAction {
    /// Stop and wait
    #[default]
    Stop,
    /// Restart from the beginning
    Loop,
    /// Quit the processor
    Quit,
}

/// Replay configuration for archive processors
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySpec {
    /// Start of the replayed range (milliseconds since epoch)
    pub start: Option<i64>,
    /// End of the replayed range (milliseconds since epoch)
    pub stop: Option<i64>,
    /// Playback speed factor (1.0 = original rate)
    pub speed: f64,
    /// Behavior at the end of the range
    pub end_action: EndAction,
}

impl Default for ReplaySpec {
    fn default() -> Self {
        Self {
            start: None,
            stop: None,
            speed: 1.0,
            end_action: EndAction::default(),
        }
    }
}

/// Configuration handed to the processor factory
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorConfig {
    /// Free-form configuration for the processor type
    Generic(String),
    /// Replay-specific configuration
    Replay(ReplaySpec),
}

/// Everything the factory needs to build a processor
#[derive(Debug, Clone)]
pub struct ProcessorSpec {
    pub key: ProcessorKey,
    pub processor_type: String,
    pub creator: String,
    pub config: Option<ProcessorConfig>,
}

/// A processing pipeline managed by another subsystem
pub trait Processor: Send + Sync {
    /// Identity of the processor
    fn key(&self) -> &ProcessorKey;

    /// Processor type (e.g., "realtime", "Archive")
    fn processor_type(&self) -> &str;

    /// Principal that created the processor
    fn creator(&self) -> &str;

    /// Whether the processor outlives its last session
    fn is_persistent(&self) -> bool;

    /// Mark the processor persistent or not
    fn set_persistent(&self, persistent: bool);

    /// Whether the processor replays archived data
    fn is_replay(&self) -> bool;

    /// Current run state
    fn state(&self) -> ProcessorState {
        *self.watch_state().borrow()
    }

    /// Receiver observing run state transitions
    fn watch_state(&self) -> watch::Receiver<ProcessorState>;

    /// Request an asynchronous start
    fn start(&self) -> Result<(), ProcessorError>;

    /// Stop the processor and release its resources
    fn quit(&self);

    /// Current internal processing counters
    fn statistics(&self) -> ProcessingStatistics;
}

/// Builds new processors for the creation workflow
pub trait ProcessorFactory: Send + Sync {
    /// Construct (but do not start) a processor
    fn create(&self, spec: ProcessorSpec) -> Result<Arc<dyn Processor>, ProcessorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_states() {
        assert!(ProcessorState::Terminated.is_final());
        assert!(ProcessorState::Failed.is_final());
        assert!(!ProcessorState::Running.is_final());
        assert!(!ProcessorState::New.is_final());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ProcessorState::Running.to_string(), "RUNNING");
        assert_eq!(ProcessorState::Failed.to_string(), "FAILED");
    }

    #[test]
    fn test_replay_spec_defaults() {
        let spec = ReplaySpec::default();
        assert_eq!(spec.speed, 1.0);
        assert_eq!(spec.end_action, EndAction::Stop);
        assert!(spec.start.is_none());
    }
}
