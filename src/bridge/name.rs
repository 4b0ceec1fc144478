//! Hierarchical names under which entities are exposed

use std::collections::HashMap;

/// Kind of entity exposed on the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeCategory {
    Services,
    Links,
    Processors,
    Clients,
    CommandQueues,
    Tables,
    Streams,
}

impl BridgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeCategory::Services => "services",
            BridgeCategory::Links => "links",
            BridgeCategory::Processors => "processors",
            BridgeCategory::Clients => "clients",
            BridgeCategory::CommandQueues => "commandQueues",
            BridgeCategory::Tables => "tables",
            BridgeCategory::Streams => "streams",
        }
    }
}

/// `<root>.<instance>:type=<category>,key=value,...`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BridgeName {
    pub root: String,
    pub instance: String,
    pub category: BridgeCategory,
    /// Ordered key properties following `type=`
    pub properties: Vec<(String, String)>,
}

impl BridgeName {
    /// Name with a single `name=` property
    pub fn named(
        root: &str,
        instance: &str,
        category: BridgeCategory,
        name: impl Into<String>,
    ) -> Self {
        Self {
            root: root.to_string(),
            instance: instance.to_string(),
            category,
            properties: vec![("name".to_string(), name.into())],
        }
    }

    /// Name of a client session, scoped by its processor
    pub fn client(root: &str, instance: &str, processor: &str, id: u32) -> Self {
        Self {
            root: root.to_string(),
            instance: instance.to_string(),
            category: BridgeCategory::Clients,
            properties: vec![
                ("processor".to_string(), processor.to_string()),
                ("id".to_string(), id.to_string()),
            ],
        }
    }

    /// Name of a command queue, scoped by its processor
    pub fn command_queue(root: &str, instance: &str, processor: &str, queue: &str) -> Self {
        Self {
            root: root.to_string(),
            instance: instance.to_string(),
            category: BridgeCategory::CommandQueues,
            properties: vec![
                ("processor".to_string(), processor.to_string()),
                ("name".to_string(), queue.to_string()),
            ],
        }
    }
}

impl std::fmt::Display for BridgeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}:type={}",
            self.root,
            self.instance,
            self.category.as_str()
        )?;
        for (key, value) in &self.properties {
            write!(f, ",{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Disambiguates services registered several times under the same name
///
/// Counts are kept per instance. The n-th live registration of `foo` in an
/// instance is exposed as `foo_n` (the first as plain `foo`). Unregistering
/// releases the most recent suffix.
#[derive(Debug, Default)]
pub struct ServiceNameTracker {
    counts: HashMap<(String, String), u32>,
}

impl ServiceNameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a new registration and return the name to expose
    pub fn acquire(&mut self, instance: &str, service: &str) -> String {
        let count = self
            .counts
            .entry((instance.to_string(), service.to_string()))
            .or_insert(0);
        *count += 1;
        suffixed(service, *count)
    }

    /// Compute the exposed name of the latest registration and release it
    pub fn release(&mut self, instance: &str, service: &str) -> String {
        let key = (instance.to_string(), service.to_string());
        match self.counts.get_mut(&key) {
            Some(count) if *count > 1 => {
                let name = suffixed(service, *count);
                *count -= 1;
                name
            }
            Some(_) => {
                self.counts.remove(&key);
                service.to_string()
            }
            None => service.to_string(),
        }
    }

    /// Live registrations of `service` in `instance`
    pub fn count(&self, instance: &str, service: &str) -> u32 {
        self.counts
            .get(&(instance.to_string(), service.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

fn suffixed(service: &str, count: u32) -> String {
    if count > 1 {
        format!("{}_{}", service, count)
    } else {
        service.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rendering() {
        let name = BridgeName::named("hub", "simulator", BridgeCategory::Links, "tm_in");
        assert_eq!(name.to_string(), "hub.simulator:type=links,name=tm_in");

        let client = BridgeName::client("hub", "simulator", "realtime", 7);
        assert_eq!(
            client.to_string(),
            "hub.simulator:type=clients,processor=realtime,id=7"
        );

        let queue = BridgeName::command_queue("hub", "simulator", "realtime", "default");
        assert_eq!(
            queue.to_string(),
            "hub.simulator:type=commandQueues,processor=realtime,name=default"
        );
    }

    #[test]
    fn test_duplicate_services_get_suffix() {
        let mut tracker = ServiceNameTracker::new();

        assert_eq!(tracker.acquire("simulator", "foo"), "foo");
        assert_eq!(tracker.acquire("simulator", "foo"), "foo_2");
        assert_eq!(tracker.acquire("simulator", "bar"), "bar");
        assert_eq!(tracker.count("simulator", "foo"), 2);

        // Latest suffix is released first
        assert_eq!(tracker.release("simulator", "foo"), "foo_2");
        assert_eq!(tracker.release("simulator", "foo"), "foo");
        assert_eq!(tracker.count("simulator", "foo"), 0);

        assert_eq!(tracker.acquire("simulator", "foo"), "foo");
    }

    #[test]
    fn test_counts_are_per_instance() {
        let mut tracker = ServiceNameTracker::new();

        assert_eq!(tracker.acquire("alpha", "foo"), "foo");
        assert_eq!(tracker.acquire("beta", "foo"), "foo");
        assert_eq!(tracker.count("alpha", "foo"), 1);

        assert_eq!(tracker.release("alpha", "foo"), "foo");
        assert_eq!(tracker.count("alpha", "foo"), 0);
        assert_eq!(tracker.count("beta", "foo"), 1);
    }

    #[test]
    fn test_release_unknown_service() {
        let mut tracker = ServiceNameTracker::new();
        assert_eq!(tracker.release("simulator", "ghost"), "ghost");
        assert_eq!(tracker.count("simulator", "ghost"), 0);
    }
}
