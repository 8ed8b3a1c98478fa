use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::reactive::{ObservableLike, Reactive};
use crate::subscription::WeakSubscription;

/// Carry a single shared accumulator across all subscribers: new subscribers replay the
/// current running total, they do not restart the fold. The source's already-current
/// value at construction time (delivered by the eager subscribe replay) is consumed to
/// seed the upstream subscription but is **not** folded in — the spec's worked example
/// (`scan` over `reactive(0)`) expects the very first emission to be exactly `seed`, with
/// reduction starting only at the first `set` that happens after `scan` is wired up.
pub fn scan<T, U, S, F>(src: &S, reducer: F, seed: U) -> Reactive<U>
where
    T: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
    S: ObservableLike<T>,
    F: Fn(&U, &T) -> U + Send + Sync + 'static,
{
    let acc = Arc::new(Mutex::new(seed.clone()));
    let out = Observable::new(seed);
    let sink = out.clone();
    let skip_replay = Arc::new(AtomicBool::new(true));
    let sub = src.subscribe_listener(Arc::new(move |v: &T| {
        if skip_replay.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut current = acc.lock().unwrap();
        let next = reducer(&current, v);
        *current = next.clone();
        sink.set(next);
    }));
    Reactive::from_parts(out, sub)
}

/// Forward values while `pred` holds; the first value failing `pred` permanently
/// terminates the subscription (the upstream is released) and is not itself emitted. The
/// output is `None` until the first passing value, since a `takeWhile` that fails
/// immediately on the source's current value must never emit a `T`.
///
/// The listener unsubscribes itself through a [`WeakSubscription`] rather than a strong
/// `Subscription` — holding a strong handle inside the closure `src` retains would keep the
/// upstream subscription alive even after the caller drops the returned `Reactive`, since
/// the closure's copy would then be the last owner.
pub fn take_while<T, S, F>(src: &S, pred: F) -> Reactive<Option<T>>
where
    T: Clone + Send + Sync + 'static,
    S: ObservableLike<T>,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    let out = Observable::new(None);
    let sink = out.clone();
    let active = Arc::new(AtomicBool::new(true));
    let weak_self: Arc<Mutex<Option<WeakSubscription>>> = Arc::new(Mutex::new(None));
    let weak_self_for_closure = weak_self.clone();
    let sub = src.subscribe_listener(Arc::new(move |v: &T| {
        if !active.load(Ordering::SeqCst) {
            return;
        }
        if pred(v) {
            sink.set(Some(v.clone()));
        } else {
            active.store(false, Ordering::SeqCst);
            if let Some(weak) = weak_self_for_closure.lock().unwrap().take() {
                weak.unsubscribe();
            }
        }
    }));
    *weak_self.lock().unwrap() = Some(sub.downgrade());
    Reactive::from_parts(out, sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::reactive;

    #[test]
    fn test_scan_sums() {
        let source = reactive(0);
        let r = scan(&source, |a: &i32, x: &i32| a + x, 0);
        let seen: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let _g = r.subscribe(move |v: &i32| s.lock().unwrap().push(*v));
        source.set(1);
        source.set(2);
        source.set(3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 3, 6]);
    }

    #[test]
    fn test_take_while_stops_at_first_failure() {
        let source = reactive(1);
        let r = take_while(&source, |v: &i32| *v < 3);
        let seen: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let _g = r.subscribe(move |v: &Option<i32>| {
            if let Some(x) = v {
                s.lock().unwrap().push(*x);
            }
        });
        source.set(2);
        source.set(3);
        source.set(4); // must not emit: subscription already terminated at 3
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_take_while_upstream_released_on_last_drop() {
        let source = reactive(1);
        let r = take_while(&source, |v: &i32| *v < 100);
        assert_eq!(source.as_observable().subscriber_count(), 1);
        drop(r);
        assert_eq!(source.as_observable().subscriber_count(), 0);
    }
}
