//! Management registry hub for a real-time data acquisition and command system
//!
//! The hub tracks the live set of processors (processing pipelines), the
//! client sessions attached to them, the data links feeding them and the
//! command queue managers gating their outbound commands. It notifies
//! subscribers of every change and polls processor statistics and link
//! health in the background.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mgmt_hub::auth::PrivilegedUsers;
//! use mgmt_hub::bridge::InMemoryBridge;
//! use mgmt_hub::{HubConfig, ManagementHub};
//! # use mgmt_hub::processor::{Processor, ProcessorFactory, ProcessorSpec};
//! # use mgmt_hub::error::ProcessorError;
//! # struct MyFactory;
//! # impl ProcessorFactory for MyFactory {
//! #     fn create(&self, _: ProcessorSpec) -> Result<Arc<dyn Processor>, ProcessorError> {
//! #         Err(ProcessorError::new("unsupported"))
//! #     }
//! # }
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = ManagementHub::new(
//!         HubConfig::default(),
//!         Arc::new(MyFactory),
//!         Arc::new(PrivilegedUsers::new().with_user("admin")),
//!     )
//!     .with_bridge(Arc::new(InMemoryBridge::new()))
//!     .init();
//!
//!     // Inject `handle.hub().clone()` into the session layer, link drivers...
//!
//!     handle.shutdown().await;
//! }
//! ```
//!
//! # Modules
//!
//! - [`hub`]: the context object, creation/connection workflows and poller
//! - [`registry`]: concurrent registries for each entity population
//! - [`listener`]: subscriber sets and event types
//! - [`bridge`]: monitoring bridge contract and naming
//! - [`stats`]: processor statistics and the broadcast cache

pub mod auth;
pub mod bridge;
pub mod commanding;
pub mod config;
pub mod error;
pub mod hub;
pub mod link;
pub mod listener;
pub mod processor;
pub mod registry;
pub mod session;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use config::HubConfig;
pub use error::{ManagementError, Result};
pub use hub::{ConnectSessionsRequest, CreateProcessorRequest, HubHandle, ManagementHub};
pub use registry::ProcessorKey;
