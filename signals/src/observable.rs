//! The observable primitive: a BehaviorSubject-style mutable cell. `subscribe` always
//! replays the current value synchronously before registering the listener for future
//! emissions; `set` updates the value and fans out to every listener, in subscription
//! order, within the call to `set`.

use std::sync::{Arc, RwLock};

use crate::broadcast::{Broadcast, IntoListener, ListenerGuard};

pub struct Observable<T> {
    value: Arc<RwLock<T>>,
    broadcast: Broadcast<T>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self { Observable { value: self.value.clone(), broadcast: self.broadcast.clone() } }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    pub fn new(initial: T) -> Self { Observable { value: Arc::new(RwLock::new(initial)), broadcast: Broadcast::new() } }

    /// Current value. Never blocks on a user callback: the lock is held only long enough
    /// to clone the value out.
    pub fn get(&self) -> T { self.value.read().unwrap().clone() }

    /// Replace the value and synchronously notify every subscriber, in subscription
    /// order. A subscriber that unsubscribes itself mid-notification does not skip any
    /// subsequent subscriber — the listener set is snapshotted before dispatch.
    pub fn set(&self, v: T) {
        {
            let mut guard = self.value.write().unwrap();
            *guard = v.clone();
        }
        self.broadcast.send(&v);
    }

    /// Register `listener`, invoke it once synchronously with the current value, then
    /// deliver every future `set`. Returns an idempotent disposer.
    pub fn subscribe<L: IntoListener<T>>(&self, listener: L) -> ListenerGuard<T> {
        let listener = listener.into_listener();
        {
            let current = self.value.read().unwrap();
            listener(&current);
        }
        self.broadcast.listen_from(listener)
    }

    pub fn subscriber_count(&self) -> usize { self.broadcast.listener_count() }

    pub(crate) fn broadcast(&self) -> &Broadcast<T> { &self.broadcast }
}
