//! Last-broadcast statistics per live processor

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::metrics::{ProcessingStatistics, StatisticsSnapshot};
use crate::registry::ProcessorKey;

/// Statistics cache keyed by processor
///
/// Every live processor has an entry. `None` means the processor has been
/// added but nothing was broadcast for it yet.
#[derive(Debug, Default)]
pub struct StatisticsCache {
    entries: RwLock<HashMap<ProcessorKey, Option<StatisticsSnapshot>>>,
}

impl StatisticsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a processor with no update yet
    pub async fn track(&self, key: ProcessorKey) {
        self.entries.write().await.insert(key, None);
    }

    /// Stop tracking a processor
    pub async fn forget(&self, key: &ProcessorKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Fold freshly reported counters into the cache
    ///
    /// Returns the snapshot to broadcast when the entry had no update yet or
    /// the reported timestamp strictly increased. Untracked processors are
    /// ignored, so a processor closed mid-poll is not resurrected.
    pub async fn refresh(
        &self,
        key: &ProcessorKey,
        stats: ProcessingStatistics,
    ) -> Option<StatisticsSnapshot> {
        let mut entries = self.entries.write().await;
        let slot = entries.get_mut(key)?;

        let due = match slot {
            None => true,
            Some(prev) => stats.last_updated > prev.last_updated,
        };
        if !due {
            return None;
        }

        let snapshot = StatisticsSnapshot::capture(key, stats);
        *slot = Some(snapshot.clone());
        Some(snapshot)
    }

    /// Last broadcast snapshot, `None` if untracked or no update yet
    pub async fn get(&self, key: &ProcessorKey) -> Option<StatisticsSnapshot> {
        self.entries.read().await.get(key).cloned().flatten()
    }

    /// Whether a processor is tracked
    pub async fn contains(&self, key: &ProcessorKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    /// Number of tracked processors
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
