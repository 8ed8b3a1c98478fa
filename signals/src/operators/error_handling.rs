//! Operators over `ObservableLike<Result<T, E>>` sources — this engine carries no separate
//! error channel, so a fallible pipeline stage is just a source whose value type happens to
//! be a `Result`.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::reactive::{ObservableLike, Reactive};
use crate::subscription::{Subscription, WeakSubscription};

/// On `Err`, detach and immediately reattach to `src` (up to `max_retries` times before
/// giving up and forwarding the error), resetting the retry count on the next `Ok`. Because
/// `src` is a hot, already-live observable rather than a cold re-triggerable producer,
/// reattaching only matters when `src`'s value can change between the failed attempt and
/// the retry (e.g. a retried computation upstream); the replay-on-subscribe that reattaching
/// triggers is what drives the retry loop forward.
fn attach<T, E, S>(src: S, sink: Observable<Result<T, E>>, attempts: Arc<AtomicU32>, max_retries: u32, held: Arc<Mutex<Option<Subscription>>>)
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    S: ObservableLike<Result<T, E>> + Clone + 'static,
{
    let src_next = src.clone();
    let sink_cb = sink.clone();
    let attempts_cb = attempts.clone();
    let held_cb = held.clone();
    let sub = src.subscribe_listener(Arc::new(move |v: &Result<T, E>| match v {
        Ok(_) => {
            attempts_cb.store(0, Ordering::SeqCst);
            sink_cb.set(v.clone());
        }
        Err(_) => {
            let tries = attempts_cb.fetch_add(1, Ordering::SeqCst) + 1;
            if tries > max_retries {
                sink_cb.set(v.clone());
                return;
            }
            if let Some(prev) = held_cb.lock().unwrap().take() {
                prev.unsubscribe();
            }
            attach(src_next.clone(), sink_cb.clone(), attempts_cb.clone(), max_retries, held_cb.clone());
        }
    }));
    *held.lock().unwrap() = Some(sub);
}

pub fn retry<T, E, S>(src: &S, max_retries: u32) -> Reactive<Result<T, E>>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    S: ObservableLike<Result<T, E>> + Clone + 'static,
{
    let out = Observable::new(src.current());
    let attempts = Arc::new(AtomicU32::new(0));
    let held: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    attach(src.clone(), out.clone(), attempts, max_retries, held.clone());

    let combined = Subscription::new(move || {
        if let Some(s) = held.lock().unwrap().take() {
            s.unsubscribe();
        }
    });
    Reactive::from_parts(out, combined)
}

/// Forward `Ok` values unchanged. On the first `Err`, unsubscribe from `src`, invoke
/// `handler(&e)` to obtain a fallback observable, and forward that fallback's emissions for
/// the rest of this subscription's lifetime. Teardown releases whichever of `src`/fallback
/// is still active — `src` is already gone once the switch has happened.
///
/// The `src` listener unsubscribes itself through a [`WeakSubscription`] rather than the
/// strong `Subscription` it's stored under, for the same reason `takeWhile` does: a strong
/// self-reference captured by the listener closure would keep `src`'s subscription alive
/// past the point this operator's own output is dropped.
pub fn catch_error<T, E, S, FB, F>(src: &S, handler: F) -> Reactive<T>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    S: ObservableLike<Result<T, E>>,
    FB: ObservableLike<T> + 'static,
    F: Fn(&E) -> FB + Send + Sync + 'static,
{
    let handler = Arc::new(handler);
    let seed = match src.current() {
        Ok(v) => v,
        Err(e) => handler(&e).current(),
    };
    let out = Observable::new(seed);

    let held_src: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let held_fallback: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let weak_src: Arc<Mutex<Option<WeakSubscription>>> = Arc::new(Mutex::new(None));

    let sink = out.clone();
    let handler_cb = handler.clone();
    let weak_src_cb = weak_src.clone();
    let held_fallback_cb = held_fallback.clone();
    let src_sub = src.subscribe_listener(Arc::new(move |v: &Result<T, E>| match v {
        Ok(v) => sink.set(v.clone()),
        Err(e) => {
            if let Some(weak) = weak_src_cb.lock().unwrap().take() {
                weak.unsubscribe();
            }
            let fallback = handler_cb(e);
            let sink_for_fallback = sink.clone();
            let fallback_sub = fallback.subscribe_listener(Arc::new(move |fv: &T| sink_for_fallback.set(fv.clone())));
            *held_fallback_cb.lock().unwrap() = Some(fallback_sub);
        }
    }));
    *weak_src.lock().unwrap() = Some(src_sub.downgrade());
    *held_src.lock().unwrap() = Some(src_sub);

    let combined = Subscription::new(move || {
        if let Some(s) = held_src.lock().unwrap().take() {
            s.unsubscribe();
        }
        if let Some(s) = held_fallback.lock().unwrap().take() {
            s.unsubscribe();
        }
    });
    Reactive::from_parts(out, combined)
}
