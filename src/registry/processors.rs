//! Live processors keyed by (instance, name)

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::key::ProcessorKey;
use crate::processor::Processor;

#[derive(Default)]
struct Inner {
    live: HashMap<ProcessorKey, Arc<dyn Processor>>,
    /// Keys claimed by a creation that has not registered its processor yet
    reserved: HashSet<ProcessorKey>,
}

/// Registry of live processors
#[derive(Default)]
pub struct ProcessorRegistry {
    inner: RwLock<Inner>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` for a processor about to be built
    ///
    /// Returns false when the key is live or already claimed. The claim ends
    /// when a processor with that key is inserted or on [`release`].
    ///
    /// [`release`]: ProcessorRegistry::release
    pub async fn reserve(&self, key: &ProcessorKey) -> bool {
        let mut inner = self.inner.write().await;
        if inner.live.contains_key(key) {
            return false;
        }
        inner.reserved.insert(key.clone())
    }

    /// Drop a claim taken with [`reserve`](ProcessorRegistry::reserve)
    pub async fn release(&self, key: &ProcessorKey) {
        self.inner.write().await.reserved.remove(key);
    }

    /// Insert a processor, returning the one it replaced
    pub async fn insert(&self, processor: Arc<dyn Processor>) -> Option<Arc<dyn Processor>> {
        let key = processor.key().clone();
        let mut inner = self.inner.write().await;
        inner.reserved.remove(&key);
        inner.live.insert(key, processor)
    }

    pub async fn remove(&self, key: &ProcessorKey) -> Option<Arc<dyn Processor>> {
        self.inner.write().await.live.remove(key)
    }

    pub async fn get(&self, key: &ProcessorKey) -> Option<Arc<dyn Processor>> {
        self.inner.read().await.live.get(key).cloned()
    }

    pub async fn contains(&self, key: &ProcessorKey) -> bool {
        self.inner.read().await.live.contains_key(key)
    }

    /// All live processors, sorted by key
    pub async fn list(&self) -> Vec<Arc<dyn Processor>> {
        let mut list: Vec<_> = self.inner.read().await.live.values().cloned().collect();
        list.sort_by(|a, b| a.key().cmp(b.key()));
        list
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.live.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.live.is_empty()
    }
}
