use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::reactive::{ObservableLike, Reactive};
use crate::subscription::Subscription;

/// Emit `(latestA, latestB)` once both sources have produced at least one value, and on
/// every subsequent emission from either.
pub fn combine_latest<A, B, SA, SB>(a: &SA, b: &SB) -> Reactive<Option<(A, B)>>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    SA: ObservableLike<A>,
    SB: ObservableLike<B>,
{
    let latest_a: Arc<Mutex<Option<A>>> = Arc::new(Mutex::new(None));
    let latest_b: Arc<Mutex<Option<B>>> = Arc::new(Mutex::new(None));
    let out = Observable::new(None);

    let la = latest_a.clone();
    let lb = latest_b.clone();
    let sink = out.clone();
    let sub_a = a.subscribe_listener(Arc::new(move |v: &A| {
        *la.lock().unwrap() = Some(v.clone());
        if let Some(bv) = lb.lock().unwrap().clone() {
            sink.set(Some((v.clone(), bv)));
        }
    }));

    let la2 = latest_a.clone();
    let lb2 = latest_b.clone();
    let sink2 = out.clone();
    let sub_b = b.subscribe_listener(Arc::new(move |v: &B| {
        *lb2.lock().unwrap() = Some(v.clone());
        if let Some(av) = la2.lock().unwrap().clone() {
            sink2.set(Some((av, v.clone())));
        }
    }));

    let combined = Subscription::new(move || {
        sub_a.unsubscribe();
        sub_b.unsubscribe();
    });
    Reactive::from_parts(out, combined)
}

/// Emit `(srcValue, latestOther)` only on `src` emissions, and only once `other` has
/// emitted at least once. `other` emissions alone never produce output.
pub fn with_latest_from<T, O, S, OS>(src: &S, other: &OS) -> Reactive<Option<(T, O)>>
where
    T: Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
    S: ObservableLike<T>,
    OS: ObservableLike<O>,
{
    let latest_other: Arc<Mutex<Option<O>>> = Arc::new(Mutex::new(None));
    let lo = latest_other.clone();
    let sub_other = other.subscribe_listener(Arc::new(move |v: &O| {
        *lo.lock().unwrap() = Some(v.clone());
    }));

    let out = Observable::new(None);
    let sink = out.clone();
    let lo2 = latest_other.clone();
    let sub_src = src.subscribe_listener(Arc::new(move |v: &T| {
        if let Some(ov) = lo2.lock().unwrap().clone() {
            sink.set(Some((v.clone(), ov)));
        }
    }));

    let combined = Subscription::new(move || {
        sub_other.unsubscribe();
        sub_src.unsubscribe();
    });
    Reactive::from_parts(out, combined)
}

/// Two FIFO buffers; whenever both are non-empty, shift one element from each and emit
/// the pair.
pub fn zip<A, B, SA, SB>(a: &SA, b: &SB) -> Reactive<Option<(A, B)>>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    SA: ObservableLike<A>,
    SB: ObservableLike<B>,
{
    let buf_a: Arc<Mutex<VecDeque<A>>> = Arc::new(Mutex::new(VecDeque::new()));
    let buf_b: Arc<Mutex<VecDeque<B>>> = Arc::new(Mutex::new(VecDeque::new()));
    let out = Observable::new(None);

    fn try_emit<A: Clone, B: Clone>(buf_a: &Mutex<VecDeque<A>>, buf_b: &Mutex<VecDeque<B>>, sink: &Observable<Option<(A, B)>>)
    where
        A: Send + Sync + 'static,
        B: Send + Sync + 'static,
    {
        let mut la = buf_a.lock().unwrap();
        let mut lb = buf_b.lock().unwrap();
        if !la.is_empty() && !lb.is_empty() {
            let av = la.pop_front().unwrap();
            let bv = lb.pop_front().unwrap();
            drop(la);
            drop(lb);
            sink.set(Some((av, bv)));
        }
    }

    let ba = buf_a.clone();
    let bb = buf_b.clone();
    let sink = out.clone();
    let sub_a = a.subscribe_listener(Arc::new(move |v: &A| {
        ba.lock().unwrap().push_back(v.clone());
        try_emit(&ba, &bb, &sink);
    }));

    let ba2 = buf_a.clone();
    let bb2 = buf_b.clone();
    let sink2 = out.clone();
    let sub_b = b.subscribe_listener(Arc::new(move |v: &B| {
        bb2.lock().unwrap().push_back(v.clone());
        try_emit(&ba2, &bb2, &sink2);
    }));

    let combined = Subscription::new(move || {
        sub_a.unsubscribe();
        sub_b.unsubscribe();
    });
    Reactive::from_parts(out, combined)
}
