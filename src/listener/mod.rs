//! Change notification fan-out
//!
//! Three independent subscriber sets, one per event category. Delivery is
//! synchronous on the thread that caused the event: a registry mutation runs
//! its subscribers before returning, the poller runs them inside its cycle.
//!
//! ```text
//!   register_session() ───┐
//!   on_processor_added() ─┼──► management: [L1, L2, ..]
//!   poll (stats) ─────────┘
//!   register_link() ──────┬──► links:      [L3, ..]
//!   poll (links) ─────────┘
//!   queue managers ──────────► queues:     [L4, ..]
//! ```
//!
//! Queue subscribers are not broadcast to from here. The hub attaches each
//! of them to every command queue manager, and the managers deliver queue
//! events themselves.
//!
//! Nothing is queued or retried. A subscriber sees only events broadcast
//! while it is registered.

mod event;
mod set;

pub use event::{LinkEvent, ManagementEvent, QueueEvent};
pub use set::ListenerSet;
#[cfg(test)]
pub(crate) use set::same_listener;

/// Receives processor, session and statistics events
pub trait ManagementListener: Send + Sync {
    fn on_management_event(&self, event: &ManagementEvent);
}

/// Receives link events
pub trait LinkListener: Send + Sync {
    fn on_link_event(&self, event: &LinkEvent);
}

/// Receives command queue events
pub trait CommandQueueListener: Send + Sync {
    fn on_queue_event(&self, event: &QueueEvent);
}

/// The three subscriber sets of the hub
#[derive(Default)]
pub struct ListenerRegistry {
    management: ListenerSet<dyn ManagementListener>,
    links: ListenerSet<dyn LinkListener>,
    queues: ListenerSet<dyn CommandQueueListener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn management(&self) -> &ListenerSet<dyn ManagementListener> {
        &self.management
    }

    pub fn links(&self) -> &ListenerSet<dyn LinkListener> {
        &self.links
    }

    pub fn queues(&self) -> &ListenerSet<dyn CommandQueueListener> {
        &self.queues
    }

    /// Deliver a management event to every management subscriber
    pub async fn notify_management(&self, event: ManagementEvent) -> usize {
        let reached = self
            .management
            .broadcast(|l| l.on_management_event(&event))
            .await;
        tracing::trace!(event = event.kind(), subscribers = reached, "Management event");
        reached
    }

    /// Deliver a link event to every link subscriber
    pub async fn notify_links(&self, event: LinkEvent) -> usize {
        self.links.broadcast(|l| l.on_link_event(&event)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::link::{LinkHealth, LinkInfo};
    use crate::testing::{RecordingLinkListener, RecordingManagementListener};

    fn link_info() -> LinkInfo {
        LinkInfo {
            instance: "simulator".into(),
            name: "tm_in".into(),
            stream: "tm_realtime".into(),
            spec: String::new(),
            enabled: true,
            health: LinkHealth::Ok,
            data_count: 0,
            detailed_status: String::new(),
        }
    }

    #[tokio::test]
    async fn test_categories_are_independent() {
        let registry = ListenerRegistry::new();
        let mgmt = Arc::new(RecordingManagementListener::default());
        let links = Arc::new(RecordingLinkListener::default());

        registry.management().add(mgmt.clone()).await;
        registry.links().add(links.clone()).await;

        let reached = registry
            .notify_links(LinkEvent::Changed(link_info()))
            .await;
        assert_eq!(reached, 1);
        assert_eq!(links.events().len(), 1);
        assert!(mgmt.events().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_subscriber_receives_once() {
        let registry = ListenerRegistry::new();
        let links = Arc::new(RecordingLinkListener::default());
        let handle: Arc<dyn LinkListener> = links.clone();

        assert!(registry.links().add(handle.clone()).await);
        assert!(!registry.links().add(handle.clone()).await);

        registry
            .notify_links(LinkEvent::Registered(link_info()))
            .await;
        assert_eq!(links.events().len(), 1);

        assert!(registry.links().remove(&handle).await);
        registry
            .notify_links(LinkEvent::Changed(link_info()))
            .await;
        assert_eq!(links.events().len(), 1);
    }
}
