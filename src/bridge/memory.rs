//! In-process bridge keeping exposed entities in a map

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use super::{BridgeEntity, BridgeName, MonitoringBridge};
use crate::error::BridgeError;

/// Bridge that keeps every exposed entity in memory
///
/// Behaves like a name server: registering a taken name or unregistering an
/// unknown one fails.
#[derive(Debug, Default)]
pub struct InMemoryBridge {
    entries: Mutex<BTreeMap<String, BridgeEntity>>,
}

impl InMemoryBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered names currently registered, sorted
    pub fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<BridgeEntity> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MonitoringBridge for InMemoryBridge {
    fn register(&self, name: &BridgeName, entity: BridgeEntity) -> Result<(), BridgeError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let key = name.to_string();
        if entries.contains_key(&key) {
            return Err(BridgeError::AlreadyRegistered(key));
        }
        entries.insert(key, entity);
        Ok(())
    }

    fn unregister(&self, name: &BridgeName) -> Result<(), BridgeError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let key = name.to_string();
        match entries.remove(&key) {
            Some(_) => Ok(()),
            None => Err(BridgeError::NotRegistered(key)),
        }
    }
}
