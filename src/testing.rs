//! Mock collaborators shared by the unit tests

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::bridge::{BridgeEntity, BridgeName, InMemoryBridge, MonitoringBridge};
use crate::commanding::{CommandQueueInfo, CommandQueueManager, QueueState};
use crate::error::{BridgeError, ProcessorError};
use crate::link::{Link, LinkHealth};
use crate::listener::{
    same_listener, CommandQueueListener, LinkEvent, LinkListener, ManagementEvent,
    ManagementListener, QueueEvent,
};
use crate::processor::{Processor, ProcessorFactory, ProcessorSpec, ProcessorState};
use crate::registry::ProcessorKey;
use crate::session::SessionClient;
use crate::stats::{PacketCounter, ProcessingStatistics};

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Install a test log subscriber once; `RUST_LOG` selects the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// How a mock processor reacts to `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBehavior {
    /// Reach `Running` immediately
    Run,
    /// Refuse to start
    Refuse,
    /// Accept the start, then fail
    Fail,
    /// Stay in `Starting` forever
    Hang,
}

pub struct MockProcessor {
    key: ProcessorKey,
    processor_type: String,
    creator: String,
    persistent: AtomicBool,
    state: watch::Sender<ProcessorState>,
    stats: Mutex<ProcessingStatistics>,
    start: StartBehavior,
    quits: AtomicUsize,
}

impl MockProcessor {
    pub fn new(instance: &str, name: &str) -> Self {
        Self::build(
            ProcessorKey::new(instance, name),
            "realtime",
            "system",
            StartBehavior::Run,
        )
    }

    pub fn arc(instance: &str, name: &str) -> Arc<Self> {
        Arc::new(Self::new(instance, name))
    }

    fn build(key: ProcessorKey, processor_type: &str, creator: &str, start: StartBehavior) -> Self {
        let (state, _) = watch::channel(ProcessorState::New);
        Self {
            key,
            processor_type: processor_type.to_string(),
            creator: creator.to_string(),
            persistent: AtomicBool::new(false),
            state,
            stats: Mutex::new(ProcessingStatistics::default()),
            start,
            quits: AtomicUsize::new(0),
        }
    }

    pub fn with_creator(mut self, creator: &str) -> Self {
        self.creator = creator.to_string();
        self
    }

    pub fn with_persistent(self, persistent: bool) -> Self {
        self.persistent.store(persistent, Ordering::SeqCst);
        self
    }

    pub fn set_state(&self, state: ProcessorState) {
        self.state.send_replace(state);
    }

    /// Report counters last updated at `last_updated`
    pub fn set_statistics(&self, last_updated: i64, received: u64) {
        let mut counter = PacketCounter::new("/SIM/HK");
        counter.received_packets = received;
        counter.last_received = last_updated;
        *lock(&self.stats) = ProcessingStatistics {
            last_updated,
            packets: vec![counter],
        };
    }

    pub fn quit_count(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }
}

impl Processor for MockProcessor {
    fn key(&self) -> &ProcessorKey {
        &self.key
    }

    fn processor_type(&self) -> &str {
        &self.processor_type
    }

    fn creator(&self) -> &str {
        &self.creator
    }

    fn is_persistent(&self) -> bool {
        self.persistent.load(Ordering::SeqCst)
    }

    fn set_persistent(&self, persistent: bool) {
        self.persistent.store(persistent, Ordering::SeqCst);
    }

    fn is_replay(&self) -> bool {
        self.processor_type == "Archive"
    }

    fn watch_state(&self) -> watch::Receiver<ProcessorState> {
        self.state.subscribe()
    }

    fn start(&self) -> Result<(), ProcessorError> {
        match self.start {
            StartBehavior::Run => {
                self.set_state(ProcessorState::Starting);
                self.set_state(ProcessorState::Running);
                Ok(())
            }
            StartBehavior::Refuse => Err(ProcessorError::new("refused to start")),
            StartBehavior::Fail => {
                self.set_state(ProcessorState::Failed);
                Ok(())
            }
            StartBehavior::Hang => {
                self.set_state(ProcessorState::Starting);
                Ok(())
            }
        }
    }

    fn quit(&self) {
        self.quits.fetch_add(1, Ordering::SeqCst);
        self.set_state(ProcessorState::Terminated);
    }

    fn statistics(&self) -> ProcessingStatistics {
        lock(&self.stats).clone()
    }
}

/// Factory building [`MockProcessor`]s and remembering them
pub struct MockFactory {
    start: Mutex<StartBehavior>,
    refuse: AtomicBool,
    build_delay: Mutex<Duration>,
    created: Mutex<Vec<Arc<MockProcessor>>>,
    specs: Mutex<Vec<ProcessorSpec>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self {
            start: Mutex::new(StartBehavior::Run),
            refuse: AtomicBool::new(false),
            build_delay: Mutex::new(Duration::ZERO),
            created: Mutex::new(Vec::new()),
            specs: Mutex::new(Vec::new()),
        }
    }

    pub fn set_start(&self, start: StartBehavior) {
        *lock(&self.start) = start;
    }

    pub fn refuse_construction(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }

    /// Block each construction for `delay`, like a factory loading an archive
    pub fn set_build_delay(&self, delay: Duration) {
        *lock(&self.build_delay) = delay;
    }

    pub fn created(&self) -> Vec<Arc<MockProcessor>> {
        lock(&self.created).clone()
    }

    pub fn specs(&self) -> Vec<ProcessorSpec> {
        lock(&self.specs).clone()
    }
}

impl ProcessorFactory for MockFactory {
    fn create(&self, spec: ProcessorSpec) -> Result<Arc<dyn Processor>, ProcessorError> {
        lock(&self.specs).push(spec.clone());
        let delay = *lock(&self.build_delay);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(ProcessorError::with_source(
                "cannot build processor",
                std::io::Error::new(std::io::ErrorKind::Other, "no such archive"),
            ));
        }

        let processor = Arc::new(MockProcessor::build(
            spec.key,
            &spec.processor_type,
            &spec.creator,
            *lock(&self.start),
        ));
        lock(&self.created).push(Arc::clone(&processor));
        let processor: Arc<dyn Processor> = processor;
        Ok(processor)
    }
}

pub struct MockClient {
    username: String,
    application: String,
    switches: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockClient {
    pub fn new(username: &str, application: &str) -> Self {
        Self {
            username: username.to_string(),
            application: application.to_string(),
            switches: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    pub fn fail_switches(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Names of the processors switched to, in order
    pub fn switches(&self) -> Vec<String> {
        lock(&self.switches).clone()
    }
}

impl SessionClient for MockClient {
    fn username(&self) -> &str {
        &self.username
    }

    fn application_name(&self) -> &str {
        &self.application
    }

    fn switch_processor(&self, processor: &Arc<dyn Processor>) -> Result<(), ProcessorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProcessorError::new("client refused to switch"));
        }
        lock(&self.switches).push(processor.key().name.clone());
        Ok(())
    }
}

pub struct MockLink {
    disabled: AtomicBool,
    data: AtomicU64,
    failed: AtomicBool,
}

impl MockLink {
    pub fn new() -> Self {
        Self {
            disabled: AtomicBool::new(false),
            data: AtomicU64::new(0),
            failed: AtomicBool::new(false),
        }
    }

    pub fn add_data(&self, n: u64) {
        self.data.fetch_add(n, Ordering::SeqCst);
    }

    pub fn set_failed(&self, failed: bool) {
        self.failed.store(failed, Ordering::SeqCst);
    }

    pub fn is_disabled_now(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }
}

impl Link for MockLink {
    fn health(&self) -> LinkHealth {
        if self.disabled.load(Ordering::SeqCst) {
            LinkHealth::Disabled
        } else if self.failed.load(Ordering::SeqCst) {
            LinkHealth::Failed
        } else {
            LinkHealth::Ok
        }
    }

    fn detailed_status(&self) -> String {
        self.health().to_string()
    }

    fn data_count(&self) -> u64 {
        self.data.load(Ordering::SeqCst)
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}

pub struct MockQueueManager {
    instance: String,
    processor_name: String,
    queues: Vec<String>,
    listeners: Mutex<Vec<Arc<dyn CommandQueueListener>>>,
}

impl MockQueueManager {
    pub fn arc(instance: &str, processor_name: &str, queues: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            instance: instance.to_string(),
            processor_name: processor_name.to_string(),
            queues: queues.iter().map(|q| q.to_string()).collect(),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

impl CommandQueueManager for MockQueueManager {
    fn instance(&self) -> &str {
        &self.instance
    }

    fn processor_name(&self) -> &str {
        &self.processor_name
    }

    fn queues(&self) -> Vec<CommandQueueInfo> {
        self.queues
            .iter()
            .map(|name| CommandQueueInfo {
                instance: self.instance.clone(),
                processor_name: self.processor_name.clone(),
                name: name.clone(),
                state: QueueState::Enabled,
                pending: 0,
            })
            .collect()
    }

    fn register_listener(&self, listener: Arc<dyn CommandQueueListener>) {
        let mut listeners = lock(&self.listeners);
        if !listeners.iter().any(|l| same_listener(l, &listener)) {
            listeners.push(listener);
        }
    }

    fn remove_listener(&self, listener: &Arc<dyn CommandQueueListener>) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|l| !same_listener(l, listener));
        listeners.len() != before
    }
}

#[derive(Default)]
pub struct RecordingManagementListener {
    events: Mutex<Vec<ManagementEvent>>,
}

impl RecordingManagementListener {
    pub fn events(&self) -> Vec<ManagementEvent> {
        lock(&self.events).clone()
    }

    pub fn statistics_count(&self) -> usize {
        lock(&self.events)
            .iter()
            .filter(|e| matches!(e, ManagementEvent::StatisticsUpdated(_)))
            .count()
    }
}

impl ManagementListener for RecordingManagementListener {
    fn on_management_event(&self, event: &ManagementEvent) {
        lock(&self.events).push(event.clone());
    }
}

#[derive(Default)]
pub struct RecordingLinkListener {
    events: Mutex<Vec<LinkEvent>>,
}

impl RecordingLinkListener {
    pub fn events(&self) -> Vec<LinkEvent> {
        lock(&self.events).clone()
    }
}

impl LinkListener for RecordingLinkListener {
    fn on_link_event(&self, event: &LinkEvent) {
        lock(&self.events).push(event.clone());
    }
}

#[derive(Default)]
pub struct RecordingQueueListener {
    events: Mutex<Vec<QueueEvent>>,
}

impl RecordingQueueListener {
    pub fn events(&self) -> Vec<QueueEvent> {
        lock(&self.events).clone()
    }
}

impl CommandQueueListener for RecordingQueueListener {
    fn on_queue_event(&self, event: &QueueEvent) {
        lock(&self.events).push(event.clone());
    }
}

/// Management listener that panics on its first statistics event
#[derive(Default)]
pub struct PanicOnceListener {
    tripped: AtomicBool,
    delivered: AtomicUsize,
}

impl PanicOnceListener {
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

impl ManagementListener for PanicOnceListener {
    fn on_management_event(&self, event: &ManagementEvent) {
        if !matches!(event, ManagementEvent::StatisticsUpdated(_)) {
            return;
        }
        if !self.tripped.swap(true, Ordering::SeqCst) {
            panic!("subscriber failure");
        }
        self.delivered.fetch_add(1, Ordering::SeqCst);
    }
}

/// Bridge refusing names that contain any of the given fragments
pub struct RejectingBridge {
    inner: InMemoryBridge,
    reject: Vec<String>,
    attempts: Mutex<Vec<String>>,
}

impl RejectingBridge {
    pub fn new(reject: &[&str]) -> Self {
        Self {
            inner: InMemoryBridge::new(),
            reject: reject.iter().map(|r| r.to_string()).collect(),
            attempts: Mutex::new(Vec::new()),
        }
    }

    /// Every name a registration was attempted for
    pub fn attempts(&self) -> Vec<String> {
        lock(&self.attempts).clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.inner.names()
    }
}

impl MonitoringBridge for RejectingBridge {
    fn register(&self, name: &BridgeName, entity: BridgeEntity) -> Result<(), BridgeError> {
        let rendered = name.to_string();
        lock(&self.attempts).push(rendered.clone());
        if self.reject.iter().any(|r| rendered.contains(r.as_str())) {
            return Err(BridgeError::Other(format!("rejected {}", rendered)));
        }
        self.inner.register(name, entity)
    }

    fn unregister(&self, name: &BridgeName) -> Result<(), BridgeError> {
        self.inner.unregister(name)
    }
}
