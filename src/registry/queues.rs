//! Command queue managers, one per (instance, processor)

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commanding::CommandQueueManager;

/// Registry of command queue managers
#[derive(Default)]
pub struct QueueManagerRegistry {
    managers: RwLock<Vec<Arc<dyn CommandQueueManager>>>,
}

impl QueueManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a manager; returns false if its key is already taken
    pub async fn add(&self, manager: Arc<dyn CommandQueueManager>) -> bool {
        let mut managers = self.managers.write().await;
        if managers
            .iter()
            .any(|m| m.instance() == manager.instance() && m.processor_name() == manager.processor_name())
        {
            return false;
        }
        managers.push(manager);
        true
    }

    pub async fn remove(
        &self,
        instance: &str,
        processor_name: &str,
    ) -> Option<Arc<dyn CommandQueueManager>> {
        let mut managers = self.managers.write().await;
        let pos = managers
            .iter()
            .position(|m| m.instance() == instance && m.processor_name() == processor_name)?;
        Some(managers.remove(pos))
    }

    pub async fn get(
        &self,
        instance: &str,
        processor_name: &str,
    ) -> Option<Arc<dyn CommandQueueManager>> {
        self.managers
            .read()
            .await
            .iter()
            .find(|m| m.instance() == instance && m.processor_name() == processor_name)
            .cloned()
    }

    /// Every manager, in registration order
    pub async fn list(&self) -> Vec<Arc<dyn CommandQueueManager>> {
        self.managers.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.managers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.managers.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockQueueManager;

    #[tokio::test]
    async fn test_one_manager_per_processor() {
        let registry = QueueManagerRegistry::new();

        assert!(registry.add(MockQueueManager::arc("simulator", "realtime", &["default"])).await);
        assert!(!registry.add(MockQueueManager::arc("simulator", "realtime", &["ops"])).await);
        assert!(registry.add(MockQueueManager::arc("simulator", "replay", &["default"])).await);
        assert_eq!(registry.len().await, 2);

        let found = registry.get("simulator", "realtime").await.unwrap();
        assert_eq!(found.queues()[0].name, "default");
    }

    #[tokio::test]
    async fn test_remove_round_trip() {
        let registry = QueueManagerRegistry::new();
        registry.add(MockQueueManager::arc("simulator", "realtime", &["default"])).await;

        assert!(registry.remove("simulator", "realtime").await.is_some());
        assert!(registry.remove("simulator", "realtime").await.is_none());
        assert!(registry.is_empty().await);
    }
}
