//! Hub configuration

use std::time::Duration;

/// Default root of every monitoring bridge name
pub const DEFAULT_BRIDGE_ROOT: &str = "hub";

/// Default principal used when a request carries no identity
pub const DEFAULT_USER: &str = "anonymous";

/// Processor type that unprivileged callers may create
pub const DEFAULT_REPLAY_TYPE: &str = "Archive";

/// Hub configuration options
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Root segment of monitoring bridge names (`<root>.<instance>:...`)
    pub bridge_root: String,

    /// Interval between statistics and link health polls
    pub poll_interval: Duration,

    /// How long a newly created processor may take to report running
    pub start_timeout: Duration,

    /// Principal assumed when a request carries no identity token
    pub default_user: String,

    /// The only processor type unprivileged callers may create
    pub replay_processor_type: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            bridge_root: DEFAULT_BRIDGE_ROOT.to_string(),
            poll_interval: Duration::from_secs(1),
            start_timeout: Duration::from_secs(10),
            default_user: DEFAULT_USER.to_string(),
            replay_processor_type: DEFAULT_REPLAY_TYPE.to_string(),
        }
    }
}

impl HubConfig {
    /// Set the bridge name root
    pub fn bridge_root(mut self, root: impl Into<String>) -> Self {
        self.bridge_root = root.into();
        self
    }

    /// Set the poll interval
    ///
    /// Zero is bumped to one millisecond, since a periodic timer cannot tick
    /// with a zero period.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the default processor start timeout
    pub fn start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    /// Set the default principal
    pub fn default_user(mut self, user: impl Into<String>) -> Self {
        self.default_user = user.into();
        self
    }

    /// Set the processor type unprivileged callers may create
    pub fn replay_processor_type(mut self, processor_type: impl Into<String>) -> Self {
        self.replay_processor_type = processor_type.into();
        self
    }
}
