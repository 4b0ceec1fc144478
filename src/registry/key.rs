//! Entity identity types

/// Unique identifier for a processor (instance + processor name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessorKey {
    /// Instance name (e.g., "simulator")
    pub instance: String,
    /// Processor name (e.g., "realtime")
    pub name: String,
}

impl ProcessorKey {
    /// Create a new processor key
    pub fn new(instance: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            name: name.into(),
        }
    }

    /// Check whether this key names `instance`/`name`
    pub fn matches(&self, instance: &str, name: &str) -> bool {
        self.instance == instance && self.name == name
    }
}

impl std::fmt::Display for ProcessorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.instance, self.name)
    }
}
