//! Client sessions keyed by a process-wide monotonic id

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::key::ProcessorKey;
use crate::error::ProcessorError;
use crate::processor::Processor;
use crate::session::{ClientInfo, SessionRecord};

/// Result of moving a session onto another processor
pub struct SwitchOutcome {
    /// Snapshot before the switch
    pub before: ClientInfo,
    /// Snapshot after the switch
    pub after: ClientInfo,
    /// Processor the session was attached to before
    pub previous: Arc<dyn Processor>,
}

/// Registry of client sessions
pub struct SessionRegistry {
    sessions: RwLock<HashMap<u32, SessionRecord>>,

    /// Next ID to hand out; IDs are never reused
    next_id: AtomicU32,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Allocate the next session ID
    pub fn allocate_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub async fn insert(&self, record: SessionRecord) -> ClientInfo {
        let info = record.info();
        self.sessions.write().await.insert(record.id, record);
        info
    }

    /// Remove a session, returning its last snapshot
    pub async fn remove(&self, id: u32) -> Option<ClientInfo> {
        self.sessions.write().await.remove(&id).map(|r| r.info())
    }

    pub async fn contains(&self, id: u32) -> bool {
        self.sessions.read().await.contains_key(&id)
    }

    pub async fn info(&self, id: u32) -> Option<ClientInfo> {
        self.sessions.read().await.get(&id).map(|r| r.info())
    }

    /// Snapshots of every session, sorted by ID
    pub async fn infos(&self) -> Vec<ClientInfo> {
        let mut infos: Vec<_> = self.sessions.read().await.values().map(|r| r.info()).collect();
        infos.sort_by_key(|c| c.id);
        infos
    }

    /// Snapshots of the sessions owned by `username`, sorted by ID
    pub async fn infos_of(&self, username: &str) -> Vec<ClientInfo> {
        let mut infos: Vec<_> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|r| r.is_owned_by(username))
            .map(|r| r.info())
            .collect();
        infos.sort_by_key(|c| c.id);
        infos
    }

    /// Number of sessions attached to `key`
    pub async fn count_attached(&self, key: &ProcessorKey) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|r| r.processor.key() == key)
            .count()
    }

    /// Move a session onto `processor`
    ///
    /// The session layer switches first; the record is only updated once it
    /// succeeded, so the session always references exactly one processor.
    /// Returns `Ok(None)` if the session does not exist.
    pub async fn switch(
        &self,
        id: u32,
        processor: Arc<dyn Processor>,
    ) -> Result<Option<SwitchOutcome>, ProcessorError> {
        let mut sessions = self.sessions.write().await;
        let Some(record) = sessions.get_mut(&id) else {
            return Ok(None);
        };

        let before = record.info();
        record.client.switch_processor(&processor)?;
        let previous = std::mem::replace(&mut record.processor, processor);
        let after = record.info();

        Ok(Some(SwitchOutcome {
            before,
            after,
            previous,
        }))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
