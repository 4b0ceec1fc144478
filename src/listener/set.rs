//! Subscriber set with identity semantics

use std::sync::Arc;

use tokio::sync::RwLock;

/// Set of subscribers identified by allocation
///
/// Two handles are the same subscriber when they point at the same
/// allocation. Broadcast clones the current members under the read lock and
/// invokes them after releasing it, so a slow subscriber never holds up
/// `add` or `remove`.
pub struct ListenerSet<L: ?Sized> {
    members: RwLock<Vec<Arc<L>>>,
}

impl<L: ?Sized> ListenerSet<L> {
    pub fn new() -> Self {
        Self {
            members: RwLock::new(Vec::new()),
        }
    }

    /// Add a subscriber; returns false if it was already present
    pub async fn add(&self, listener: Arc<L>) -> bool {
        let mut members = self.members.write().await;
        if members.iter().any(|m| same_listener(m, &listener)) {
            return false;
        }
        members.push(listener);
        true
    }

    /// Remove a subscriber; returns false if it was not present
    pub async fn remove(&self, listener: &Arc<L>) -> bool {
        let mut members = self.members.write().await;
        let before = members.len();
        members.retain(|m| !same_listener(m, listener));
        members.len() != before
    }

    pub async fn contains(&self, listener: &Arc<L>) -> bool {
        self.members
            .read()
            .await
            .iter()
            .any(|m| same_listener(m, listener))
    }

    /// Current members
    pub async fn snapshot(&self) -> Vec<Arc<L>> {
        self.members.read().await.clone()
    }

    /// Invoke `deliver` on every current member
    ///
    /// Returns the number of subscribers reached.
    pub async fn broadcast<F>(&self, mut deliver: F) -> usize
    where
        F: FnMut(&L),
    {
        let members = self.snapshot().await;
        for member in &members {
            deliver(&**member);
        }
        members.len()
    }

    pub async fn clear(&self) {
        self.members.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }
}

impl<L: ?Sized> Default for ListenerSet<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare by data pointer only; vtable pointers of the same type may differ
/// between codegen units.
pub(crate) fn same_listener<L: ?Sized>(a: &Arc<L>, b: &Arc<L>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
