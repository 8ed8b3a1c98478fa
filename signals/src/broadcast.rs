//! Fan-out primitive shared by every observable in this crate: a set of listeners keyed
//! by a monotonic id, invoked synchronously and in insertion order on `send`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

/// Converts a value into a [`Listener`]. Implemented for plain closures and for channel
/// senders, so `observable.subscribe(tx)` and `observable.subscribe(|v| ...)` both work.
pub trait IntoListener<T> {
    fn into_listener(self) -> Listener<T>;
}

impl<T, F> IntoListener<T> for F
where
    F: Fn(&T) + Send + Sync + 'static,
{
    fn into_listener(self) -> Listener<T> { Arc::new(self) }
}

impl<T> IntoListener<T> for tokio::sync::mpsc::UnboundedSender<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn into_listener(self) -> Listener<T> { Arc::new(move |v: &T| { let _ = self.send(v.clone()); }) }
}

impl<T> IntoListener<T> for std::sync::mpsc::Sender<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn into_listener(self) -> Listener<T> { Arc::new(move |v: &T| { let _ = self.send(v.clone()); }) }
}

struct Inner<T> {
    listeners: RwLock<HashMap<usize, Listener<T>>>,
    next_id: AtomicUsize,
}

/// A broadcast channel: zero allocation cost until the first listener attaches, cheap to
/// clone (it is a handle around an `Arc`), and safe to `send` into reentrantly — a listener
/// that subscribes or unsubscribes during a `send` never corrupts the in-flight iteration
/// because the listener set is snapshotted before dispatch.
pub struct Broadcast<T>(Arc<Inner<T>>);

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self { Broadcast(self.0.clone()) }
}

impl<T> Default for Broadcast<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Broadcast<T> {
    pub fn new() -> Self { Broadcast(Arc::new(Inner { listeners: RwLock::new(HashMap::new()), next_id: AtomicUsize::new(0) })) }

    /// Register a listener; returns a guard that removes it on drop (or on an explicit
    /// `unsubscribe()` call — both are idempotent).
    pub fn listen<L: IntoListener<T>>(&self, listener: L) -> ListenerGuard<T> { self.listen_from(listener.into_listener()) }

    /// Register an already-converted listener. Exposed so callers that need to invoke the
    /// listener once before registering it (BehaviorSubject replay) can do so with the
    /// exact `Arc` that ends up in the listener set.
    pub fn listen_from(&self, listener: Listener<T>) -> ListenerGuard<T> {
        let id = self.0.next_id.fetch_add(1, Ordering::Relaxed);
        self.0.listeners.write().unwrap().insert(id, listener);
        ListenerGuard { inner: Arc::downgrade(&self.0), id }
    }

    pub fn listener_count(&self) -> usize { self.0.listeners.read().unwrap().len() }

    /// Dispatch `value` to every currently-registered listener, in insertion order. The
    /// listener map is cloned out from under the lock first, so a listener is free to
    /// subscribe or drop its own guard without deadlocking.
    pub fn send(&self, value: &T) {
        let mut snapshot: Vec<(usize, Listener<T>)> = { self.0.listeners.read().unwrap().iter().map(|(id, l)| (*id, l.clone())).collect() };
        snapshot.sort_by_key(|(id, _)| *id);
        for (_, listener) in snapshot {
            listener(value);
        }
    }
}

/// Auto-unsubscribing handle returned by [`Broadcast::listen`].
pub struct ListenerGuard<T> {
    inner: Weak<Inner<T>>,
    id: usize,
}

impl<T> ListenerGuard<T> {
    /// Detach the listener. Safe to call more than once; later calls are no-ops.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.write().unwrap().remove(&self.id);
        }
    }
}

impl<T> Drop for ListenerGuard<T> {
    fn drop(&mut self) { self.unsubscribe(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn test_multiple_subscribers() {
        let b = Broadcast::new();
        let hits = Arc::new(AtomicU32::new(0));
        let h1 = hits.clone();
        let h2 = hits.clone();
        let _g1 = b.listen(move |_: &i32| { h1.fetch_add(1, Ordering::SeqCst); });
        let _g2 = b.listen(move |_: &i32| { h2.fetch_add(10, Ordering::SeqCst); });
        b.send(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let b = Broadcast::new();
        let hits = Arc::new(AtomicU32::new(0));
        let h = hits.clone();
        let g = b.listen(move |_: &i32| { h.fetch_add(1, Ordering::SeqCst); });
        g.unsubscribe();
        g.unsubscribe();
        b.send(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_detaches() {
        let b = Broadcast::new();
        let hits = Arc::new(AtomicU32::new(0));
        let h = hits.clone();
        let g = b.listen(move |_: &i32| { h.fetch_add(1, Ordering::SeqCst); });
        drop(g);
        b.send(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(b.listener_count(), 0);
    }

    #[test]
    fn test_reentrant_subscription_during_send() {
        let b: Broadcast<i32> = Broadcast::new();
        let nested_seen = Arc::new(AtomicU32::new(0));
        let b2 = b.clone();
        let seen = nested_seen.clone();
        let _outer = b.listen(move |_v: &i32| {
            let seen = seen.clone();
            let guard = b2.listen(move |_: &i32| { seen.fetch_add(1, Ordering::SeqCst); });
            drop(guard);
        });
        // Must not deadlock, and must not panic.
        b.send(&1);
        b.send(&2);
    }
}
