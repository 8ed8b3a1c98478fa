//! `Reactive<T>` is an [`Observable`] with `map`/`filter` derivation. A derived `Reactive`
//! subscribes to its upstream eagerly, at the moment `map`/`filter` is called, and keeps
//! that subscription alive for as long as the derived value itself is alive — in Rust
//! terms, for as long as any clone of the returned `Reactive` (they share one `Arc`)
//! survives. Dropping the last clone drops the held upstream subscription, which is the
//! Rust realization of "released on the derived's last unsubscribe": there is no GC
//! finalizer to wait for, so ownership dropping the `Arc` to zero *is* that moment.

use std::sync::Arc;

use crate::broadcast::{IntoListener, Listener};
use crate::observable::Observable;
use crate::subscription::Subscription;

struct Inner<T: Clone + Send + Sync + 'static> {
    observable: Observable<T>,
    // Held only so its teardown runs when this Reactive's last reference goes away.
    _upstream: Option<Subscription>,
}

pub struct Reactive<T: Clone + Send + Sync + 'static> {
    inner: Arc<Inner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Clone for Reactive<T> {
    fn clone(&self) -> Self { Reactive { inner: self.inner.clone() } }
}

impl<T: Clone + Send + Sync + 'static> Reactive<T> {
    pub fn new(initial: T) -> Self { Reactive { inner: Arc::new(Inner { observable: Observable::new(initial), _upstream: None }) } }

    /// Build a derived `Reactive` around an already-primed `Observable`, holding `upstream`
    /// for the derived value's lifetime. Used by operator functions so they can all share
    /// this one "operator observable" representation (§4 of the spec: every operator
    /// produces something with the same subscribe/teardown contract as a plain Observable).
    pub(crate) fn from_parts(observable: Observable<T>, upstream: Subscription) -> Self {
        Reactive { inner: Arc::new(Inner { observable, _upstream: Some(upstream) }) }
    }

    pub fn get(&self) -> T { self.inner.observable.get() }

    pub fn set(&self, v: T) { self.inner.observable.set(v) }

    pub fn subscribe<L: IntoListener<T>>(&self, listener: L) -> Subscription {
        let guard = self.inner.observable.subscribe(listener);
        Subscription::new(move || guard.unsubscribe())
    }

    pub fn subscriber_count(&self) -> usize { self.inner.observable.subscriber_count() }

    pub(crate) fn as_observable(&self) -> &Observable<T> { &self.inner.observable }

    /// Derive `Reactive<U>` by applying `f` to every emission, replaying `f(current)` to
    /// new subscribers. The upstream subscription is created right here, not deferred to
    /// the first downstream `subscribe`.
    pub fn map<U, F>(&self, f: F) -> Reactive<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        let initial = f(&self.get());
        let derived = Observable::new(initial);
        let sink = derived.clone();
        let guard = self.inner.observable.subscribe(move |v: &T| sink.set(f(v)));
        Reactive::from_parts(derived, Subscription::new(move || guard.unsubscribe()))
    }

    /// Derive `Reactive<T>` that only forwards emissions satisfying `pred`. The initial
    /// value is always the source's current value regardless of whether it passes the
    /// predicate — a `Reactive` must always hold *some* value of type `T`, so there is no
    /// "unset" state to fall back to; only subsequent emissions are gated.
    pub fn filter<F>(&self, pred: F) -> Reactive<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let initial = self.get();
        let derived = Observable::new(initial);
        let sink = derived.clone();
        let guard = self.inner.observable.subscribe(move |v: &T| {
            if pred(v) {
                sink.set(v.clone());
            }
        });
        Reactive::from_parts(derived, Subscription::new(move || guard.unsubscribe()))
    }
}

/// Uniform interface implemented by every observable-shaped type in this crate (plain
/// `Observable<T>` and derived `Reactive<T>`), so operator functions can take `&impl
/// ObservableLike<T>` instead of being hand-written per concrete source type.
pub trait ObservableLike<T: Clone + Send + Sync + 'static>: Send + Sync {
    fn current(&self) -> T;
    /// Register an already-built listener and return its teardown. Implementations must
    /// replay the current value to `listener` synchronously before returning, matching
    /// BehaviorSubject subscribe semantics.
    fn subscribe_listener(&self, listener: Listener<T>) -> Subscription;
}

impl<T: Clone + Send + Sync + 'static> ObservableLike<T> for Observable<T> {
    fn current(&self) -> T { self.get() }
    fn subscribe_listener(&self, listener: Listener<T>) -> Subscription {
        let guard = self.subscribe(listener);
        Subscription::new(move || guard.unsubscribe())
    }
}

impl<T: Clone + Send + Sync + 'static> ObservableLike<T> for Reactive<T> {
    fn current(&self) -> T { self.get() }
    fn subscribe_listener(&self, listener: Listener<T>) -> Subscription {
        let guard = self.inner.observable.subscribe(listener);
        Subscription::new(move || guard.unsubscribe())
    }
}

/// Construct a root `Reactive<T>` with no upstream — the entry point into the operator
/// library (`reactive(initial)` in the language-neutral API).
pub fn reactive<T: Clone + Send + Sync + 'static>(initial: T) -> Reactive<T> { Reactive::new(initial) }
