//! Management hub driven by a simulated processor subsystem
//!
//! Run with: cargo run --example simulated_hub
//!
//! Starts a hub with one persistent realtime processor, registers a couple of
//! sessions and a link, then lets an unprivileged user create a replay and
//! move their session onto it. Every management and link event is printed.
//! Press Ctrl+C to stop.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use mgmt_hub::auth::{AuthToken, PrivilegedUsers};
use mgmt_hub::bridge::InMemoryBridge;
use mgmt_hub::error::ProcessorError;
use mgmt_hub::link::{Link, LinkHealth};
use mgmt_hub::listener::{LinkEvent, LinkListener, ManagementEvent, ManagementListener};
use mgmt_hub::processor::{Processor, ProcessorFactory, ProcessorSpec, ProcessorState};
use mgmt_hub::session::SessionClient;
use mgmt_hub::stats::{PacketCounter, ProcessingStatistics};
use mgmt_hub::{CreateProcessorRequest, HubConfig, ManagementHub, ProcessorKey};
use tokio::sync::watch;

/// Processor producing a steadily growing packet count
struct SimProcessor {
    key: ProcessorKey,
    processor_type: String,
    creator: String,
    persistent: AtomicBool,
    state: watch::Sender<ProcessorState>,
    packets: AtomicU64,
    updated: AtomicI64,
}

impl SimProcessor {
    fn new(spec: ProcessorSpec) -> Self {
        let (state, _) = watch::channel(ProcessorState::New);
        Self {
            key: spec.key,
            processor_type: spec.processor_type,
            creator: spec.creator,
            persistent: AtomicBool::new(false),
            state,
            packets: AtomicU64::new(0),
            updated: AtomicI64::new(0),
        }
    }

    fn tick(&self) {
        self.packets.fetch_add(10, Ordering::Relaxed);
        self.updated.fetch_add(1_000, Ordering::Relaxed);
    }
}

impl Processor for SimProcessor {
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
        self.persistent.load(Ordering::Relaxed)
    }

    fn set_persistent(&self, persistent: bool) {
        self.persistent.store(persistent, Ordering::Relaxed);
    }

    fn is_replay(&self) -> bool {
        self.processor_type == "Archive"
    }

    fn watch_state(&self) -> watch::Receiver<ProcessorState> {
        self.state.subscribe()
    }

    fn start(&self) -> Result<(), ProcessorError> {
        self.state.send_replace(ProcessorState::Running);
        Ok(())
    }

    fn quit(&self) {
        self.state.send_replace(ProcessorState::Terminated);
    }

    fn statistics(&self) -> ProcessingStatistics {
        let mut counter = PacketCounter::new("/SIM/HK");
        counter.received_packets = self.packets.load(Ordering::Relaxed);
        ProcessingStatistics {
            last_updated: self.updated.load(Ordering::Relaxed),
            packets: vec![counter],
        }
    }
}

/// Factory remembering what it built so the demo can drive it
#[derive(Default)]
struct SimFactory {
    built: Mutex<Vec<Arc<SimProcessor>>>,
}

impl SimFactory {
    fn tick_all(&self) {
        let built = self.built.lock().unwrap_or_else(PoisonError::into_inner);
        for processor in built.iter() {
            if processor.state.borrow().is_final() {
                continue;
            }
            processor.tick();
        }
    }
}

impl ProcessorFactory for SimFactory {
    fn create(&self, spec: ProcessorSpec) -> Result<Arc<dyn Processor>, ProcessorError> {
        let processor = Arc::new(SimProcessor::new(spec));
        self.built
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&processor));
        let processor: Arc<dyn Processor> = processor;
        Ok(processor)
    }
}

struct Console {
    user: String,
}

impl SessionClient for Console {
    fn username(&self) -> &str {
        &self.user
    }

    fn application_name(&self) -> &str {
        "console"
    }

    fn switch_processor(&self, processor: &Arc<dyn Processor>) -> Result<(), ProcessorError> {
        println!("  [{}] now following {}", self.user, processor.key());
        Ok(())
    }
}

struct UdpLink {
    received: AtomicU64,
    disabled: AtomicBool,
}

impl Link for UdpLink {
    fn health(&self) -> LinkHealth {
        if self.disabled.load(Ordering::Relaxed) {
            LinkHealth::Disabled
        } else {
            LinkHealth::Ok
        }
    }

    fn detailed_status(&self) -> String {
        format!("{} packets", self.received.load(Ordering::Relaxed))
    }

    fn data_count(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
    }
}

struct Printer;

impl ManagementListener for Printer {
    fn on_management_event(&self, event: &ManagementEvent) {
        match event {
            ManagementEvent::StatisticsUpdated(s) => println!(
                "stats {}/{}: {} packets",
                s.instance,
                s.processor_name,
                s.counters.iter().map(|c| c.received_packets).sum::<u64>()
            ),
            other => println!("event {}: {:?}", other.kind(), other),
        }
    }
}

impl LinkListener for Printer {
    fn on_link_event(&self, event: &LinkEvent) {
        if let LinkEvent::Changed(info) = event {
            println!("link {}: {} ({})", info.name, info.health, info.detailed_status);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mgmt_hub=debug".parse()?),
        )
        .init();

    let bridge = Arc::new(InMemoryBridge::new());
    let factory = Arc::new(SimFactory::default());
    let handle = ManagementHub::new(
        HubConfig::default().poll_interval(Duration::from_millis(500)),
        factory.clone(),
        Arc::new(PrivilegedUsers::new().with_user("admin")),
    )
    .with_bridge(bridge.clone())
    .init();

    let printer = Arc::new(Printer);
    handle.add_management_listener(printer.clone()).await;
    handle.add_link_listener(printer).await;

    let admin = AuthToken::new("admin");
    handle
        .create_processor(
            CreateProcessorRequest::new("simulator", "realtime", "realtime").persistent(true),
            Some(&admin),
        )
        .await?;

    let alice = handle
        .register_session(
            "simulator",
            "realtime",
            Arc::new(Console {
                user: "alice".into(),
            }),
        )
        .await?;
    handle
        .register_session(
            "simulator",
            "realtime",
            Arc::new(Console { user: "bob".into() }),
        )
        .await?;

    let link = Arc::new(UdpLink {
        received: AtomicU64::new(0),
        disabled: AtomicBool::new(false),
    });
    handle
        .register_link("simulator", "tm_in", "tm_realtime", "udp:10015", link.clone())
        .await;

    // Unprivileged replay of alice's own session
    handle
        .create_processor(
            CreateProcessorRequest::new("simulator", "alice_replay", "Archive").clients([alice]),
            Some(&AuthToken::new("alice")),
        )
        .await?;

    println!("bridge: {:#?}", bridge.names());

    let mut ticker = tokio::time::interval(Duration::from_millis(300));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                link.received.fetch_add(25, Ordering::Relaxed);
                factory.tick_all();
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}
