use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::observable::Observable;
use crate::reactive::{ObservableLike, Reactive};
use crate::subscription::Subscription;

/// Queue each source emission on a `tokio` timer and emit the buffered value once
/// `duration` elapses. Requires an active Tokio runtime (the timers are spawned tasks).
/// Teardown aborts every outstanding timer task; a value already queued when teardown
/// happens never emits.
pub fn delay<T, S>(src: &S, duration: Duration) -> Reactive<T>
where
    T: Clone + Send + Sync + 'static,
    S: ObservableLike<T>,
{
    let out = Observable::new(src.current());
    let sink = out.clone();
    let skip_replay = Arc::new(AtomicBool::new(true));
    let handles: Arc<Mutex<Vec<JoinHandle<()>>>> = Arc::new(Mutex::new(Vec::new()));
    let handles_for_spawn = handles.clone();
    let upstream = src.subscribe_listener(Arc::new(move |v: &T| {
        if skip_replay.swap(false, Ordering::SeqCst) {
            return;
        }
        let sink = sink.clone();
        let v = v.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            sink.set(v);
        });
        let mut guard = handles_for_spawn.lock().unwrap();
        guard.retain(|h| !h.is_finished());
        guard.push(handle);
    }));
    let combined = Subscription::new(move || {
        upstream.unsubscribe();
        for h in handles.lock().unwrap().drain(..) {
            h.abort();
        }
    });
    Reactive::from_parts(out, combined)
}

/// Hold the latest source value; on every `notifier` emission, if a source value has been
/// observed, emit it (no deduplication — the same latest value can be emitted repeatedly).
pub fn sample<T, N, S, NS>(src: &S, notifier: &NS) -> Reactive<Option<T>>
where
    T: Clone + Send + Sync + 'static,
    N: Clone + Send + Sync + 'static,
    S: ObservableLike<T>,
    NS: ObservableLike<N>,
{
    let latest: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
    let latest_writer = latest.clone();
    let src_sub = src.subscribe_listener(Arc::new(move |v: &T| {
        *latest_writer.lock().unwrap() = Some(v.clone());
    }));

    let out = Observable::new(None);
    let sink = out.clone();
    let latest_reader = latest.clone();
    let notifier_sub = notifier.subscribe_listener(Arc::new(move |_n: &N| {
        let value = latest_reader.lock().unwrap().clone();
        if value.is_some() {
            sink.set(value);
        }
    }));

    let combined = Subscription::new(move || {
        src_sub.unsubscribe();
        notifier_sub.unsubscribe();
    });
    Reactive::from_parts(out, combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::reactive;
    use std::sync::Mutex as StdMutex;

    #[tokio::test]
    async fn test_delay_emits_after_duration() {
        let source = reactive(0);
        let delayed = delay(&source, Duration::from_millis(10));
        let seen: Arc<StdMutex<Vec<i32>>> = Arc::new(StdMutex::new(Vec::new()));
        let s = seen.clone();
        let _g = delayed.subscribe(move |v: &i32| s.lock().unwrap().push(*v));
        source.set(7);
        assert_eq!(*seen.lock().unwrap(), vec![0]); // not yet, still queued
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(*seen.lock().unwrap(), vec![0, 7]);
    }

    #[tokio::test]
    async fn test_delay_teardown_cancels_pending_timer() {
        let source = reactive(0);
        let delayed = delay(&source, Duration::from_millis(20));
        let seen: Arc<StdMutex<Vec<i32>>> = Arc::new(StdMutex::new(Vec::new()));
        let s = seen.clone();
        let g = delayed.subscribe(move |v: &i32| s.lock().unwrap().push(*v));
        source.set(9);
        g.unsubscribe();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[test]
    fn test_sample_holds_latest_and_does_not_dedupe() {
        let source = reactive(0);
        let ticks = reactive(());
        let sampled = sample(&source, &ticks);
        let seen: Arc<StdMutex<Vec<i32>>> = Arc::new(StdMutex::new(Vec::new()));
        let s = seen.clone();
        let _g = sampled.subscribe(move |v: &Option<i32>| {
            if let Some(x) = v {
                s.lock().unwrap().push(*x);
            }
        });
        // Construction itself counts as one notifier "tick" (the eager replay), so the
        // source's value at construction time (0) is already sampled once.
        source.set(5);
        ticks.set(());
        ticks.set(());
        assert_eq!(*seen.lock().unwrap(), vec![0, 5, 5]);
    }
}
