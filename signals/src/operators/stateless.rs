//! `tap`, `startWith`, `pairwise` — `map`/`filter` live as methods on
//! [`Reactive`](crate::reactive::Reactive) itself since they are the primitive derivation
//! the type exists for; everything else in this family is a free function over any
//! [`ObservableLike`] source.

use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::operator::Operator;
use crate::reactive::{ObservableLike, Reactive};

/// Forward every value unchanged, running `f` as a side effect on each one (including the
/// replayed current value delivered to the operator's own first subscriber setup). A
/// panic inside `f` propagates to the caller exactly as a `set` on `src` would.
pub fn tap<T, S, F>(src: &S, f: F) -> Reactive<T>
where
    T: Clone + Send + Sync + 'static,
    S: ObservableLike<T>,
    F: Fn(&T) + Send + Sync + 'static,
{
    let out = Observable::new(src.current());
    let sink = out.clone();
    let sub = src.subscribe_listener(Arc::new(move |v: &T| {
        f(v);
        sink.set(v.clone());
    }));
    Reactive::from_parts(out, sub)
}

/// Replay `seed`, then the source's current value, to every new subscriber, then forward
/// all subsequent source emissions. Unlike `map`/`filter`/`scan`, `startWith` resubscribes
/// to `src` per downstream subscriber rather than sharing one upstream subscription, since
/// the two-value replay sequence must happen for *each* subscriber, not once at
/// construction.
pub fn start_with<T, S>(src: &S, seed: T) -> Operator<T>
where
    T: Clone + Send + Sync + 'static,
    S: ObservableLike<T> + Clone + 'static,
{
    let src_for_get = src.clone();
    let src_for_sub = src.clone();
    Operator::new(move || src_for_get.current(), move |listener| {
        listener(&seed);
        src_for_sub.subscribe_listener(listener)
    })
}

/// Emit `(prev, curr)` for every source emission after the first. The first value (which
/// may be the source's already-current value, delivered as the eager subscribe replay)
/// only seeds `prev` — there is no pair to emit yet, so new subscribers see `None` until
/// two source values have been observed.
pub fn pairwise<T, S>(src: &S) -> Reactive<Option<(T, T)>>
where
    T: Clone + Send + Sync + 'static,
    S: ObservableLike<T>,
{
    let prev: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
    let out = Observable::new(None);
    let sink = out.clone();
    let prev_cell = prev.clone();
    let sub = src.subscribe_listener(Arc::new(move |v: &T| {
        let mut p = prev_cell.lock().unwrap();
        if let Some(prior) = p.clone() {
            sink.set(Some((prior, v.clone())));
        }
        *p = Some(v.clone());
    }));
    Reactive::from_parts(out, sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::reactive;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn test_tap_forwards_unchanged_and_runs_side_effect() {
        let r = reactive(1);
        let sum = Arc::new(AtomicI32::new(0));
        let s = sum.clone();
        let tapped = tap(&r, move |v: &i32| { s.fetch_add(*v, Ordering::SeqCst); });
        assert_eq!(tapped.get(), 1);
        r.set(10);
        assert_eq!(tapped.get(), 10);
        assert_eq!(sum.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_start_with_replays_seed_then_current_per_subscriber() {
        let r = reactive(5);
        let op = start_with(&r, 0);
        let seen: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let _g = op.subscribe(move |v: &i32| s.lock().unwrap().push(*v));
        assert_eq!(*seen.lock().unwrap(), vec![0, 5]);
        r.set(6);
        assert_eq!(*seen.lock().unwrap(), vec![0, 5, 6]);

        // A second, later subscriber sees the full [seed, current] replay again.
        let seen2: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
        let s2 = seen2.clone();
        let _g2 = op.subscribe(move |v: &i32| s2.lock().unwrap().push(*v));
        assert_eq!(*seen2.lock().unwrap(), vec![0, 6]);
    }

    #[test]
    fn test_pairwise_emits_from_second_value() {
        let r = reactive(1);
        let p = pairwise(&r);
        let seen: Arc<Mutex<Vec<(i32, i32)>>> = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let _g = p.subscribe(move |v: &Option<(i32, i32)>| {
            if let Some(pair) = v {
                s.lock().unwrap().push(*pair);
            }
        });
        r.set(2);
        r.set(3);
        r.set(4);
        assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 3), (3, 4)]);
    }
}
