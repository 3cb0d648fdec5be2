//! Collector isolation: keep background memory reclamation out of timings.
//!
//! Rust has no ambient garbage collector, but embedded runtimes and some
//! allocators run background reclamation that can inject multi-millisecond
//! pauses unrelated to the code under test. An installed [`Collector`] is
//! suspended once for the whole measurement loop (not per iteration) and
//! its prior state restored on every exit path.

/// A suspendable source of background memory reclamation.
///
/// Implementations must tolerate redundant transitions: `set_enabled` with
/// the current state is a no-op.
pub trait Collector: Send + Sync {
    /// Whether automatic collection is currently enabled.
    fn is_enabled(&self) -> bool;

    /// Enable or disable automatic collection.
    fn set_enabled(&self, enabled: bool);
}

/// RAII pause of a [`Collector`].
///
/// Construction records the prior state and disables collection; dropping
/// restores the prior state. The drop runs during unwinding, so a panicking
/// timed block never leaks a suspended collector.
pub struct CollectorPause<'a> {
    collector: &'a dyn Collector,
    was_enabled: bool,
}

impl<'a> CollectorPause<'a> {
    /// Suspend `collector` until the returned guard is dropped.
    pub fn new(collector: &'a dyn Collector) -> Self {
        let was_enabled = collector.is_enabled();
        collector.set_enabled(false);
        Self {
            collector,
            was_enabled,
        }
    }
}

impl Drop for CollectorPause<'_> {
    fn drop(&mut self) {
        self.collector.set_enabled(self.was_enabled);
    }
}
