//! Optional instrumentation hooks (§2 item 9): counters for live subscribers, active
//! operators, and live queries, exposed as a single periodic snapshot observable. Nothing
//! in `reactive_signals`/`reactive_store` calls into this automatically — callers opt in by
//! calling `record_*` at the points they care about (e.g. around `subscribe`/`unsubscribe`
//! on pipelines they build), the same "instrumentation is a façade concern, not a core one"
//! posture the spec's scope section assigns to DevTools-style diagnostics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reactive_signals::{reactive, Reactive};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    pub subscriber_count: usize,
    pub operator_count: usize,
    pub live_query_count: usize,
}

pub struct Diagnostics {
    subscribers: Arc<AtomicUsize>,
    operators: Arc<AtomicUsize>,
    live_queries: Arc<AtomicUsize>,
    snapshot: Reactive<DiagnosticsSnapshot>,
}

impl Default for Diagnostics {
    fn default() -> Self { Self::new() }
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics {
            subscribers: Arc::new(AtomicUsize::new(0)),
            operators: Arc::new(AtomicUsize::new(0)),
            live_queries: Arc::new(AtomicUsize::new(0)),
            snapshot: reactive(DiagnosticsSnapshot::default()),
        }
    }

    pub fn record_subscriber_delta(&self, delta: i64) {
        Self::apply(&self.subscribers, delta);
        self.publish();
    }

    pub fn record_operator_delta(&self, delta: i64) {
        Self::apply(&self.operators, delta);
        self.publish();
    }

    pub fn record_live_query_delta(&self, delta: i64) {
        Self::apply(&self.live_queries, delta);
        self.publish();
    }

    fn apply(counter: &AtomicUsize, delta: i64) {
        if delta >= 0 {
            counter.fetch_add(delta as usize, Ordering::SeqCst);
        } else {
            counter.fetch_sub((-delta) as usize, Ordering::SeqCst);
        }
    }

    fn publish(&self) {
        self.snapshot.set(DiagnosticsSnapshot {
            subscriber_count: self.subscribers.load(Ordering::SeqCst),
            operator_count: self.operators.load(Ordering::SeqCst),
            live_query_count: self.live_queries.load(Ordering::SeqCst),
        });
    }

    /// Replays the current counts to every new subscriber, then every subsequent change.
    pub fn snapshot(&self) -> Reactive<DiagnosticsSnapshot> { self.snapshot.clone() }
}
