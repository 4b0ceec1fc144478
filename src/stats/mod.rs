//! Processor statistics
//!
//! Processors report raw [`ProcessingStatistics`]. The hub keeps the last
//! broadcast [`StatisticsSnapshot`] per live processor in a
//! [`StatisticsCache`] and rebroadcasts only when the reported timestamp
//! moves forward.

mod cache;
mod metrics;

pub use cache::StatisticsCache;
pub use metrics::{PacketCounter, ProcessingStatistics, StatisticsSnapshot};
