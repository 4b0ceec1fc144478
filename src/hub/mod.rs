//! The management hub
//!
//! [`ManagementHub`] is the context object tying the entity registries, the
//! statistics cache, the subscriber sets and the optional monitoring bridge
//! together. Collaborators get it injected (usually through the
//! [`HubHandle`] returned by [`ManagementHub::init`]) instead of reaching
//! for a process-wide singleton.
//!
//! # Architecture
//!
//! ```text
//!     session layer   processor subsystem   link drivers   queue managers
//!          │                  │                  │               │
//!          ▼                  ▼                  ▼               ▼
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │ ManagementHub                                                    │
//!   │   processors ── stats cache      sessions      links   managers  │
//!   │        │                            │            │        │      │
//!   │        └──────────── ListenerRegistry ◄──────────┴────────┘      │
//!   │                           ▲                                      │
//!   │                     poller task (stats + link health)            │
//!   └──────────────────────────────────────────────────────────────────┘
//!          │
//!          ▼
//!   MonitoringBridge (optional)
//! ```
//!
//! Mutating calls notify subscribers on the caller's task before
//! returning. The poller notifies on its own task.

mod lifecycle;
mod poller;

pub use lifecycle::{ConnectSessionsRequest, CreateProcessorRequest};
pub use poller::HubHandle;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::Authorizer;
use crate::bridge::{BridgeCategory, BridgeEntity, BridgeName, MonitoringBridge, ServiceNameTracker};
use crate::commanding::CommandQueueManager;
use crate::config::HubConfig;
use crate::error::{ManagementError, Result};
use crate::link::{Link, LinkEntry, LinkInfo};
use crate::listener::{
    CommandQueueListener, LinkEvent, LinkListener, ListenerRegistry, ManagementEvent,
    ManagementListener, QueueEvent,
};
use crate::processor::{Processor, ProcessorFactory, ProcessorInfo};
use crate::registry::{
    LinkRegistry, ProcessorKey, ProcessorRegistry, QueueManagerRegistry, SessionRegistry,
};
use crate::session::{ClientInfo, SessionClient, SessionRecord};
use crate::stats::{StatisticsCache, StatisticsSnapshot};

/// Registry hub for processors, sessions, links and command queues
pub struct ManagementHub {
    config: HubConfig,
    listeners: ListenerRegistry,
    processors: ProcessorRegistry,
    stats: StatisticsCache,
    sessions: SessionRegistry,
    links: LinkRegistry,
    queue_managers: QueueManagerRegistry,
    services: Mutex<ServiceNameTracker>,
    /// Serializes wiring of queue subscribers onto managers
    queue_wiring: Mutex<()>,
    bridge: Option<Arc<dyn MonitoringBridge>>,
    factory: Arc<dyn ProcessorFactory>,
    authorizer: Arc<dyn Authorizer>,
}

impl ManagementHub {
    /// Create a hub without a monitoring bridge
    pub fn new(
        config: HubConfig,
        factory: Arc<dyn ProcessorFactory>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            config,
            listeners: ListenerRegistry::new(),
            processors: ProcessorRegistry::new(),
            stats: StatisticsCache::new(),
            sessions: SessionRegistry::new(),
            links: LinkRegistry::new(),
            queue_managers: QueueManagerRegistry::new(),
            services: Mutex::new(ServiceNameTracker::new()),
            queue_wiring: Mutex::new(()),
            bridge: None,
            factory,
            authorizer,
        }
    }

    /// Expose entities through a monitoring bridge
    pub fn with_bridge(mut self, bridge: Arc<dyn MonitoringBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Get the hub configuration
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Subscriber sets, for inspection
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    // ---- Listeners -------------------------------------------------------

    /// Subscribe to processor, session and statistics events
    ///
    /// Returns false if the listener was already subscribed.
    pub async fn add_management_listener(&self, listener: Arc<dyn ManagementListener>) -> bool {
        self.listeners.management().add(listener).await
    }

    pub async fn remove_management_listener(&self, listener: &Arc<dyn ManagementListener>) -> bool {
        self.listeners.management().remove(listener).await
    }

    /// Subscribe to link events
    pub async fn add_link_listener(&self, listener: Arc<dyn LinkListener>) -> bool {
        self.listeners.links().add(listener).await
    }

    pub async fn remove_link_listener(&self, listener: &Arc<dyn LinkListener>) -> bool {
        self.listeners.links().remove(listener).await
    }

    /// Subscribe to command queue events
    ///
    /// A new subscriber is also attached to every registered manager and
    /// receives the current state of each of their queues.
    pub async fn add_command_queue_listener(&self, listener: Arc<dyn CommandQueueListener>) -> bool {
        let _wiring = self.queue_wiring.lock().await;
        if !self.listeners.queues().add(Arc::clone(&listener)).await {
            return false;
        }
        for manager in self.queue_managers.list().await {
            subscribe_to_manager(manager.as_ref(), &listener);
        }
        true
    }

    /// Unsubscribe from command queue events, globally and on every manager
    pub async fn remove_command_queue_listener(
        &self,
        listener: &Arc<dyn CommandQueueListener>,
    ) -> bool {
        let _wiring = self.queue_wiring.lock().await;
        let removed = self.listeners.queues().remove(listener).await;
        for manager in self.queue_managers.list().await {
            manager.remove_listener(listener);
        }
        removed
    }

    // ---- Processors ------------------------------------------------------

    /// A processor came to life
    pub async fn on_processor_added(&self, processor: Arc<dyn Processor>) {
        let key = processor.key().clone();
        self.stats.track(key.clone()).await;
        if self.processors.insert(Arc::clone(&processor)).await.is_some() {
            tracing::debug!(processor = %key, "Processor re-added");
        }

        let info = self.snapshot_processor(processor.as_ref()).await;
        self.expose(
            self.named(&key.instance, BridgeCategory::Processors, &key.name),
            BridgeEntity::Processor(info.clone()),
        );
        self.listeners
            .notify_management(ManagementEvent::ProcessorAdded(info))
            .await;

        tracing::info!(processor = %key, "Processor added");
    }

    /// A processor was closed
    pub async fn on_processor_closed(&self, key: &ProcessorKey) {
        self.stats.forget(key).await;
        let Some(processor) = self.processors.remove(key).await else {
            return;
        };

        let info = self.snapshot_processor(processor.as_ref()).await;
        self.withdraw(self.named(&key.instance, BridgeCategory::Processors, &key.name));
        self.listeners
            .notify_management(ManagementEvent::ProcessorClosed(info))
            .await;

        tracing::info!(processor = %key, "Processor closed");
    }

    /// A processor changed run state
    pub async fn on_processor_state_changed(&self, key: &ProcessorKey) {
        let Some(processor) = self.processors.get(key).await else {
            return;
        };

        let info = self.snapshot_processor(processor.as_ref()).await;
        tracing::debug!(processor = %key, state = %info.state, "Processor state changed");
        self.listeners
            .notify_management(ManagementEvent::ProcessorStateChanged(info))
            .await;
    }

    /// Look up a live processor
    pub async fn processor(&self, instance: &str, name: &str) -> Option<Arc<dyn Processor>> {
        self.processors.get(&ProcessorKey::new(instance, name)).await
    }

    pub async fn processor_info(&self, key: &ProcessorKey) -> Option<ProcessorInfo> {
        let processor = self.processors.get(key).await?;
        Some(self.snapshot_processor(processor.as_ref()).await)
    }

    /// Snapshots of every live processor, sorted by key
    pub async fn processors(&self) -> Vec<ProcessorInfo> {
        let mut infos = Vec::new();
        for processor in self.processors.list().await {
            infos.push(self.snapshot_processor(processor.as_ref()).await);
        }
        infos
    }

    /// Last broadcast statistics of a processor
    pub async fn statistics(&self, key: &ProcessorKey) -> Option<StatisticsSnapshot> {
        self.stats.get(key).await
    }

    async fn snapshot_processor(&self, processor: &dyn Processor) -> ProcessorInfo {
        let attached = self.sessions.count_attached(processor.key()).await;
        ProcessorInfo::capture(processor, attached)
    }

    // ---- Sessions --------------------------------------------------------

    /// Register a session attached to `instance`/`processor_name`
    ///
    /// The ID is allocated before the processor is resolved, so a failed
    /// registration still consumes one.
    pub async fn register_session(
        &self,
        instance: &str,
        processor_name: &str,
        client: Arc<dyn SessionClient>,
    ) -> Result<u32> {
        let id = self.sessions.allocate_id();
        let key = ProcessorKey::new(instance, processor_name);
        let processor = self
            .processors
            .get(&key)
            .await
            .ok_or_else(|| ManagementError::not_found(format!("processor {}", key)))?;

        let info = self
            .sessions
            .insert(SessionRecord::new(id, processor, client))
            .await;
        self.expose(
            self.client_name(&info),
            BridgeEntity::Client(info.clone()),
        );

        tracing::info!(
            session_id = id,
            processor = %key,
            username = %info.username,
            application = %info.application,
            "Session registered"
        );
        self.listeners
            .notify_management(ManagementEvent::SessionRegistered(info))
            .await;

        Ok(id)
    }

    /// Unregister a session; unknown IDs are ignored
    pub async fn unregister_session(&self, id: u32) {
        let Some(info) = self.sessions.remove(id).await else {
            return;
        };

        self.withdraw(self.client_name(&info));
        tracing::info!(session_id = id, "Session unregistered");
        self.listeners
            .notify_management(ManagementEvent::SessionUnregistered(info))
            .await;
    }

    pub async fn client_info(&self, id: u32) -> Option<ClientInfo> {
        self.sessions.info(id).await
    }

    /// Snapshots of every session, sorted by ID
    pub async fn clients(&self) -> Vec<ClientInfo> {
        self.sessions.infos().await
    }

    /// Snapshots of the sessions owned by `username`
    pub async fn clients_of(&self, username: &str) -> Vec<ClientInfo> {
        self.sessions.infos_of(username).await
    }

    // ---- Links -----------------------------------------------------------

    /// Register a link owned by a driver
    pub async fn register_link(
        &self,
        instance: &str,
        name: &str,
        stream: &str,
        spec: &str,
        link: Arc<dyn Link>,
    ) -> LinkInfo {
        let info = self
            .links
            .register(LinkEntry::new(instance, name, stream, spec, link))
            .await;
        self.expose(
            self.named(instance, BridgeCategory::Links, name),
            BridgeEntity::Link(info.clone()),
        );

        tracing::info!(instance = instance, link = name, stream = stream, "Link registered");
        self.listeners
            .notify_links(LinkEvent::Registered(info.clone()))
            .await;
        info
    }

    /// Unregister a link; unknown links are ignored
    pub async fn unregister_link(&self, instance: &str, name: &str) {
        if self.links.unregister(instance, name).await.is_none() {
            return;
        }

        self.withdraw(self.named(instance, BridgeCategory::Links, name));
        tracing::info!(instance = instance, link = name, "Link unregistered");
        self.listeners
            .notify_links(LinkEvent::Unregistered {
                instance: instance.to_string(),
                name: name.to_string(),
            })
            .await;
    }

    pub async fn enable_link(&self, instance: &str, name: &str) -> Result<()> {
        tracing::debug!(instance = instance, link = name, "Enable link requested");
        self.links.enable(instance, name).await
    }

    pub async fn disable_link(&self, instance: &str, name: &str) -> Result<()> {
        tracing::debug!(instance = instance, link = name, "Disable link requested");
        self.links.disable(instance, name).await
    }

    pub async fn link_info(&self, instance: &str, name: &str) -> Option<LinkInfo> {
        self.links.info(instance, name).await
    }

    /// Last snapshots of every link, in registration order
    pub async fn links(&self) -> Vec<LinkInfo> {
        self.links.infos().await
    }

    // ---- Command queues --------------------------------------------------

    /// Register the command queue manager of a processor
    ///
    /// Each queue is exposed on the bridge; the first bridge failure skips
    /// the remaining queues but the manager is still tracked. Every current
    /// queue subscriber is attached to the manager and immediately receives
    /// the state of each queue.
    pub async fn register_command_queue_manager(&self, manager: Arc<dyn CommandQueueManager>) {
        let instance = manager.instance().to_string();
        let processor_name = manager.processor_name().to_string();

        let _wiring = self.queue_wiring.lock().await;
        if self
            .queue_managers
            .get(&instance, &processor_name)
            .await
            .is_some()
        {
            tracing::warn!(
                instance = %instance,
                processor = %processor_name,
                "Command queue manager already registered, ignoring"
            );
            return;
        }

        for queue in manager.queues() {
            let name = self.queue_name(&instance, &processor_name, &queue.name);
            if !self.expose(name, BridgeEntity::CommandQueue(queue)) {
                tracing::warn!(
                    instance = %instance,
                    processor = %processor_name,
                    "Skipping remaining command queue bridge registrations"
                );
                break;
            }
        }

        self.queue_managers.add(Arc::clone(&manager)).await;

        let subscribers = self.listeners.queues().snapshot().await;
        for listener in &subscribers {
            subscribe_to_manager(manager.as_ref(), listener);
        }

        tracing::info!(
            instance = %instance,
            processor = %processor_name,
            queues = manager.queues().len(),
            subscribers = subscribers.len(),
            "Command queue manager registered"
        );
    }

    /// Drop the command queue manager of a processor; unknown keys are ignored
    pub async fn unregister_command_queue_manager(&self, instance: &str, processor_name: &str) {
        let _wiring = self.queue_wiring.lock().await;
        let Some(manager) = self.queue_managers.remove(instance, processor_name).await else {
            return;
        };

        for queue in manager.queues() {
            self.withdraw(self.queue_name(instance, processor_name, &queue.name));
        }
        for listener in self.listeners.queues().snapshot().await {
            manager.remove_listener(&listener);
        }

        tracing::info!(
            instance = instance,
            processor = processor_name,
            "Command queue manager unregistered"
        );
    }

    /// Find the command queue manager of `instance`/`processor_name`
    pub async fn queue_manager(
        &self,
        instance: &str,
        processor_name: &str,
    ) -> Result<Arc<dyn CommandQueueManager>> {
        self.queue_managers
            .get(instance, processor_name)
            .await
            .ok_or_else(|| {
                ManagementError::not_found(format!(
                    "command queue manager for {}/{}",
                    instance, processor_name
                ))
            })
    }

    /// Command queue manager of a processor, if it has one
    pub async fn queue_manager_for(&self, key: &ProcessorKey) -> Option<Arc<dyn CommandQueueManager>> {
        self.queue_managers.get(&key.instance, &key.name).await
    }

    /// Every command queue manager, in registration order
    pub async fn queue_managers(&self) -> Vec<Arc<dyn CommandQueueManager>> {
        self.queue_managers.list().await
    }

    // ---- Services and storage --------------------------------------------

    /// Expose a service on the bridge
    ///
    /// Returns the exposed name: the service name, suffixed with `_N` when
    /// `N` registrations of that name are live in `instance`.
    pub async fn register_service(&self, instance: &str, service: &str) -> String {
        if self.bridge.is_none() {
            return service.to_string();
        }

        let exposed = self.services.lock().await.acquire(instance, service);
        self.expose(
            self.named(instance, BridgeCategory::Services, &exposed),
            BridgeEntity::Service(service.to_string()),
        );
        exposed
    }

    /// Withdraw the latest registration of a service from the bridge
    pub async fn unregister_service(&self, instance: &str, service: &str) {
        if self.bridge.is_none() {
            return;
        }

        let exposed = self.services.lock().await.release(instance, service);
        self.withdraw(self.named(instance, BridgeCategory::Services, &exposed));
    }

    pub fn register_table(&self, database: &str, table: &str) {
        self.expose(
            self.named(database, BridgeCategory::Tables, table),
            BridgeEntity::Table {
                database: database.to_string(),
                table: table.to_string(),
            },
        );
    }

    pub fn unregister_table(&self, database: &str, table: &str) {
        self.withdraw(self.named(database, BridgeCategory::Tables, table));
    }

    pub fn register_stream(&self, database: &str, stream: &str) {
        self.expose(
            self.named(database, BridgeCategory::Streams, stream),
            BridgeEntity::Stream {
                database: database.to_string(),
                stream: stream.to_string(),
            },
        );
    }

    pub fn unregister_stream(&self, database: &str, stream: &str) {
        self.withdraw(self.named(database, BridgeCategory::Streams, stream));
    }

    // ---- Bridge helpers --------------------------------------------------

    fn named(&self, instance: &str, category: BridgeCategory, name: &str) -> BridgeName {
        BridgeName::named(&self.config.bridge_root, instance, category, name)
    }

    fn client_name(&self, info: &ClientInfo) -> BridgeName {
        BridgeName::client(
            &self.config.bridge_root,
            &info.instance,
            &info.processor_name,
            info.id,
        )
    }

    fn queue_name(&self, instance: &str, processor_name: &str, queue: &str) -> BridgeName {
        BridgeName::command_queue(&self.config.bridge_root, instance, processor_name, queue)
    }

    /// Register on the bridge; false if the bridge refused
    fn expose(&self, name: BridgeName, entity: BridgeEntity) -> bool {
        let Some(bridge) = &self.bridge else {
            return true;
        };
        match bridge.register(&name, entity) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "Bridge registration failed");
                false
            }
        }
    }

    fn withdraw(&self, name: BridgeName) {
        let Some(bridge) = &self.bridge else {
            return;
        };
        if let Err(e) = bridge.unregister(&name) {
            tracing::warn!(name = %name, error = %e, "Bridge unregistration failed");
        }
    }
}

/// Attach a listener to a manager and replay the current queue states
fn subscribe_to_manager(manager: &dyn CommandQueueManager, listener: &Arc<dyn CommandQueueListener>) {
    manager.register_listener(Arc::clone(listener));
    for queue in manager.queues() {
        listener.on_queue_event(&QueueEvent::QueueUpdated(queue));
    }
}
