//! Runtime configuration.

/// Default ceiling for actions processed in one drain of the pending queue.
pub const DEFAULT_MAX_QUEUED_DISPATCHES: usize = 10_000;

/// Settings for a [`Runtime`](crate::Runtime).
///
/// ```ignore
/// let config = RuntimeConfig::new().with_max_queued_dispatches(64);
/// let runtime = Runtime::with_config(HostTree::new(), config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Actions queued by hooks and listeners are drained after each update.
    /// A component that keeps re-sending from `did_update` would loop forever;
    /// past this many actions the drain stops with `DispatchOverflow`.
    pub max_queued_dispatches: usize,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_queued_dispatches(mut self, limit: usize) -> Self {
        self.max_queued_dispatches = limit;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_queued_dispatches: DEFAULT_MAX_QUEUED_DISPATCHES,
        }
    }
}
