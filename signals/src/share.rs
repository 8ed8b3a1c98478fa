//! Multicasting: fan one upstream subscription out to many downstream subscribers without
//! replaying history to late joiners. `Multicast` exposes connect/disconnect explicitly;
//! `Share` wraps it with reference counting so the first subscriber connects and the last
//! unsubscribe disconnects automatically.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::broadcast::{Broadcast, IntoListener, Listener};
use crate::reactive::ObservableLike;
use crate::subscription::Subscription;

pub struct Multicast<T: Clone + Send + Sync + 'static> {
    broadcast: Broadcast<T>,
    source_sub: Arc<Mutex<Option<Subscription>>>,
    connector: Arc<dyn Fn(Listener<T>) -> Subscription + Send + Sync>,
}

impl<T: Clone + Send + Sync + 'static> Clone for Multicast<T> {
    fn clone(&self) -> Self {
        Multicast { broadcast: self.broadcast.clone(), source_sub: self.source_sub.clone(), connector: self.connector.clone() }
    }
}

impl<T: Clone + Send + Sync + 'static> Multicast<T> {
    pub fn new<S: ObservableLike<T> + 'static>(src: S) -> Self {
        let connector: Arc<dyn Fn(Listener<T>) -> Subscription + Send + Sync> = Arc::new(move |l| src.subscribe_listener(l));
        Multicast { broadcast: Broadcast::new(), source_sub: Arc::new(Mutex::new(None)), connector }
    }

    /// Register a downstream listener. Deliberately does **not** replay any prior value —
    /// a subscriber joining after emissions have already happened only sees what comes
    /// next, unlike the eager-replay `Observable`/`Reactive` subscribe contract.
    pub fn subscribe<L: IntoListener<T>>(&self, listener: L) -> Subscription {
        let guard = self.broadcast.listen(listener);
        Subscription::new(move || guard.unsubscribe())
    }

    pub fn subscriber_count(&self) -> usize { self.broadcast.listener_count() }

    /// Attach to the upstream source, feeding every emission into the shared broadcast.
    /// Idempotent — connecting an already-connected multicast is a no-op.
    pub fn connect(&self) {
        let mut guard = self.source_sub.lock().unwrap();
        if guard.is_some() {
            return;
        }
        let sink = self.broadcast.clone();
        let sub = (self.connector)(Arc::new(move |v: &T| sink.send(v)));
        *guard = Some(sub);
    }

    pub fn disconnect(&self) {
        if let Some(s) = self.source_sub.lock().unwrap().take() {
            s.unsubscribe();
        }
    }

    pub fn is_connected(&self) -> bool { self.source_sub.lock().unwrap().is_some() }
}

pub struct Share<T: Clone + Send + Sync + 'static> {
    multicast: Multicast<T>,
    count: Arc<AtomicUsize>,
}

impl<T: Clone + Send + Sync + 'static> Clone for Share<T> {
    fn clone(&self) -> Self { Share { multicast: self.multicast.clone(), count: self.count.clone() } }
}

impl<T: Clone + Send + Sync + 'static> Share<T> {
    pub fn new<S: ObservableLike<T> + 'static>(src: S) -> Self {
        Share { multicast: Multicast::new(src), count: Arc::new(AtomicUsize::new(0)) }
    }

    /// Connect on the first subscriber, disconnect when the last unsubscribes. Subscribers
    /// in between share the single upstream connection.
    pub fn subscribe<L: IntoListener<T>>(&self, listener: L) -> Subscription {
        if self.count.fetch_add(1, Ordering::SeqCst) == 0 {
            self.multicast.connect();
        }
        let inner = self.multicast.subscribe(listener);
        let count = self.count.clone();
        let multicast = self.multicast.clone();
        Subscription::new(move || {
            inner.unsubscribe();
            if count.fetch_sub(1, Ordering::SeqCst) == 1 {
                multicast.disconnect();
            }
        })
    }

    pub fn subscriber_count(&self) -> usize { self.count.load(Ordering::SeqCst) }

    pub fn is_connected(&self) -> bool { self.multicast.is_connected() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::reactive;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn test_multicast_late_subscriber_sees_no_history() {
        let source = reactive(1);
        let m = Multicast::new(source.clone());
        m.connect();
        source.set(2);
        let seen: Arc<StdMutex<Vec<i32>>> = Arc::new(StdMutex::new(Vec::new()));
        let s = seen.clone();
        let _g = m.subscribe(move |v: &i32| s.lock().unwrap().push(*v));
        assert!(seen.lock().unwrap().is_empty());
        source.set(3);
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[test]
    fn test_share_reference_counts_connect_and_disconnect() {
        let source = reactive(0);
        let shared = Share::new(source.clone());
        assert!(!shared.is_connected());

        let g1 = shared.subscribe(|_v: &i32| {});
        assert_eq!(shared.subscriber_count(), 1);
        assert!(shared.is_connected());

        let g2 = shared.subscribe(|_v: &i32| {});
        let g3 = shared.subscribe(|_v: &i32| {});
        assert_eq!(shared.subscriber_count(), 3);

        g2.unsubscribe();
        g3.unsubscribe();
        assert_eq!(shared.subscriber_count(), 1);
        assert!(shared.is_connected());

        g1.unsubscribe();
        assert_eq!(shared.subscriber_count(), 0);
        assert!(!shared.is_connected());

        let g4 = shared.subscribe(|_v: &i32| {});
        assert_eq!(shared.subscriber_count(), 1);
        assert!(shared.is_connected());
        g4.unsubscribe();
    }
}
