//! # Registration options for listeners.
//!
//! Defines [`ListenerOptions`] a configuration bundle passed to
//! [`EventBus::on_with`](crate::EventBus::on_with) describing how a listener
//! participates in dispatch (priority placement, one-shot semantics).

/// Options controlling how a listener is registered.
///
/// - `priority`: higher values dispatch earlier; ties keep registration order.
/// - `once`: remove the listener after its first invocation (success or failure).
///
/// ## Example
/// ```rust
/// use priobus::ListenerOptions;
///
/// let opts = ListenerOptions::default().with_priority(10).with_once(true);
/// assert_eq!(opts.priority, 10);
/// assert!(opts.once);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ListenerOptions {
    /// Dispatch priority; higher runs earlier. Default 0.
    pub priority: i32,
    /// One-shot flag; removed after the first invocation. Default false.
    pub once: bool,
}

impl ListenerOptions {
    /// Creates options with default values (priority 0, not once).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns updated options with the given priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns updated options with the given one-shot flag.
    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }
}
