//! Data links
//!
//! Links are external data channels owned by their drivers. The hub keeps a
//! [`LinkEntry`] per registered link holding the last snapshot it broadcast,
//! so the poller can tell when the driver-side health moved.

use std::sync::Arc;

/// Externally observed health of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkHealth {
    /// Connected and flowing
    Ok,
    /// Peer not reachable
    Unavailable,
    /// Administratively disabled
    Disabled,
    /// Driver reported a failure
    Failed,
}

impl std::fmt::Display for LinkHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LinkHealth::Ok => "OK",
            LinkHealth::Unavailable => "UNAVAIL",
            LinkHealth::Disabled => "DISABLED",
            LinkHealth::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A data link as implemented by its driver
pub trait Link: Send + Sync {
    /// Current health
    fn health(&self) -> LinkHealth;

    /// Driver-specific status text
    fn detailed_status(&self) -> String;

    /// Number of data units moved through the link
    fn data_count(&self) -> u64;

    fn is_disabled(&self) -> bool;

    fn enable(&self);

    fn disable(&self);
}

/// Point-in-time copy of a link's state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub instance: String,
    pub name: String,
    /// Stream the link feeds or drains
    pub stream: String,
    /// Configuration the link was created from
    pub spec: String,
    pub enabled: bool,
    pub health: LinkHealth,
    pub data_count: u64,
    pub detailed_status: String,
}

/// Registry entry for one link
pub struct LinkEntry {
    instance: String,
    name: String,
    stream: String,
    spec: String,
    link: Arc<dyn Link>,
    last: LinkInfo,
}

impl LinkEntry {
    pub fn new(
        instance: impl Into<String>,
        name: impl Into<String>,
        stream: impl Into<String>,
        spec: impl Into<String>,
        link: Arc<dyn Link>,
    ) -> Self {
        let instance = instance.into();
        let name = name.into();
        let stream = stream.into();
        let spec = spec.into();
        let last = observe(&instance, &name, &stream, &spec, link.as_ref());

        Self {
            instance,
            name,
            stream,
            spec,
            link,
            last,
        }
    }

    /// Check if this entry is `instance`/`name`
    pub fn matches(&self, instance: &str, name: &str) -> bool {
        self.instance == instance && self.name == name
    }

    /// Last snapshot taken of the link
    pub fn info(&self) -> &LinkInfo {
        &self.last
    }

    pub fn enable(&self) {
        self.link.enable();
    }

    pub fn disable(&self) {
        self.link.disable();
    }

    /// Re-read the link and return the new snapshot if anything moved
    pub fn poll_change(&mut self) -> Option<LinkInfo> {
        let current = observe(
            &self.instance,
            &self.name,
            &self.stream,
            &self.spec,
            self.link.as_ref(),
        );
        if current == self.last {
            return None;
        }
        self.last = current.clone();
        Some(current)
    }
}

fn observe(instance: &str, name: &str, stream: &str, spec: &str, link: &dyn Link) -> LinkInfo {
    LinkInfo {
        instance: instance.to_string(),
        name: name.to_string(),
        stream: stream.to_string(),
        spec: spec.to_string(),
        enabled: !link.is_disabled(),
        health: link.health(),
        data_count: link.data_count(),
        detailed_status: link.detailed_status(),
    }
}
