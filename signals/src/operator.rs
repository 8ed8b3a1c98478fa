//! A handful of operators (`startWith` chief among them) must replay a short, fixed
//! sequence to *every* new subscriber rather than a single cached "current" value, which
//! the BehaviorSubject-shaped [`Observable`](crate::observable::Observable) cannot express.
//! `Operator<T>` is the closure-based escape hatch for those: `subscribe` is a function
//! called fresh per subscriber, with full freedom over what it replays before forwarding
//! live emissions.

use crate::broadcast::{IntoListener, Listener};
use crate::reactive::ObservableLike;
use crate::subscription::Subscription;
use std::sync::Arc;

pub struct Operator<T: Clone + Send + Sync + 'static> {
    get: Arc<dyn Fn() -> T + Send + Sync>,
    subscribe: Arc<dyn Fn(Listener<T>) -> Subscription + Send + Sync>,
}

impl<T: Clone + Send + Sync + 'static> Clone for Operator<T> {
    fn clone(&self) -> Self { Operator { get: self.get.clone(), subscribe: self.subscribe.clone() } }
}

impl<T: Clone + Send + Sync + 'static> Operator<T> {
    pub fn new<G, F>(get: G, subscribe: F) -> Self
    where
        G: Fn() -> T + Send + Sync + 'static,
        F: Fn(Listener<T>) -> Subscription + Send + Sync + 'static,
    {
        Operator { get: Arc::new(get), subscribe: Arc::new(subscribe) }
    }

    pub fn get(&self) -> T { (self.get)() }

    pub fn subscribe<L: IntoListener<T>>(&self, listener: L) -> Subscription { (self.subscribe)(listener.into_listener()) }
}

impl<T: Clone + Send + Sync + 'static> ObservableLike<T> for Operator<T> {
    fn current(&self) -> T { self.get() }
    fn subscribe_listener(&self, listener: Listener<T>) -> Subscription { (self.subscribe)(listener) }
}
