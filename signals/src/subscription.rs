//! The single teardown type returned by every `subscribe` in this crate, whether the
//! subscription holds one listener guard, several (a combination operator), or a timer
//! handle. Disposal is idempotent and also happens automatically on drop, so callers that
//! never call `unsubscribe()` explicitly still release every resource.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

struct Inner {
    disposed: AtomicBool,
    teardown: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

#[derive(Clone)]
pub struct Subscription(Arc<Inner>);

impl Subscription {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Subscription(Arc::new(Inner { disposed: AtomicBool::new(false), teardown: Mutex::new(Some(Box::new(teardown))) }))
    }

    /// A subscription with nothing to release — used by operators whose only resource is
    /// their listener guard, held via a captured drop rather than an explicit teardown.
    pub fn noop() -> Self { Subscription::new(|| {}) }

    /// Release every held resource. Safe to call more than once or alongside letting the
    /// value drop; only the first call (whichever happens first) runs the teardown.
    pub fn unsubscribe(&self) {
        if self.0.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(f) = self.0.teardown.lock().unwrap().take() {
            f();
        }
    }

    /// A non-owning handle that can still trigger teardown. Used by operators (e.g.
    /// `takeWhile`) whose own listener closure needs to unsubscribe itself from the inside —
    /// holding a strong `Subscription` there would keep the teardown alive for as long as
    /// the listener itself is registered, which is exactly what the teardown is supposed to
    /// release.
    pub fn downgrade(&self) -> WeakSubscription { WeakSubscription(Arc::downgrade(&self.0)) }
}

/// Upgrades to a live [`Subscription`] only if something else is still holding one; once
/// every strong handle has dropped (or already unsubscribed), `unsubscribe` is a no-op.
#[derive(Clone)]
pub struct WeakSubscription(Weak<Inner>);

impl WeakSubscription {
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.0.upgrade() {
            Subscription(inner).unsubscribe();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            if let Some(f) = self.teardown.lock().unwrap().take() {
                f();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_unsubscribe_idempotent() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let sub = Subscription::new(move || { c.fetch_add(1, Ordering::SeqCst); });
        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_runs_teardown_once() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        {
            let sub = Subscription::new(move || { c.fetch_add(1, Ordering::SeqCst); });
            sub.unsubscribe();
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
