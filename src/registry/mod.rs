//! Entity registries
//!
//! Four independent collections, each behind its own `RwLock`, so churn in
//! one population never blocks another.
//!
//! ```text
//!   ProcessorRegistry     HashMap<ProcessorKey, Arc<dyn Processor>>
//!   SessionRegistry       HashMap<u32, SessionRecord>   + AtomicU32 ids
//!   LinkRegistry          Vec<LinkEntry>                (linear scan)
//!   QueueManagerRegistry  Vec<Arc<dyn CommandQueueManager>>
//! ```
//!
//! Registries only store and look up. Notifications and bridge exposure are
//! driven by the hub around them.

mod key;
mod links;
mod processors;
mod queues;
mod sessions;

pub use key::ProcessorKey;
pub use links::LinkRegistry;
pub use processors::ProcessorRegistry;
pub use queues::QueueManagerRegistry;
pub use sessions::{SessionRegistry, SwitchOutcome};
