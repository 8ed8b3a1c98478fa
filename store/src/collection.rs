//! The collection engine: validated CRUD over a named, schema-bound set of JSON-backed
//! records, with a live observable view and filtered derivations built on `reactive_signals`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

use reactive_signals::{reactive, Reactive};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DuplicateIdError, MissingIdError, StoreError, ValidationError};
use crate::filter;
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Initializing,
    Ready,
    Error(String),
    Disconnected,
}

fn record_id(value: &Value) -> Result<String, StoreError> {
    match value.get("id") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(StoreError::Validation(ValidationError::single("id", "missing required field"))),
    }
}

fn merge_patch(base: &mut Value, patch: &Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (k, v) in patch_obj {
            base_obj.insert(k.clone(), v.clone());
        }
    }
}

/// A named, schema-validated collection of records. `T` is the typed record shape;
/// mutations take and return raw `serde_json::Value` payloads, validated against `schema`
/// before they ever touch `docs` — the store never holds a record that doesn't parse.
pub struct Collection<T, S: Schema<T>>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    name: String,
    schema: Arc<S>,
    live: Reactive<Vec<T>>,
    readiness: Arc<RwLock<Readiness>>,
    warned: Arc<Mutex<HashSet<(String, String)>>>,
}

impl<T, S: Schema<T>> Clone for Collection<T, S>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Collection { name: self.name.clone(), schema: self.schema.clone(), live: self.live.clone(), readiness: self.readiness.clone(), warned: self.warned.clone() }
    }
}

impl<T, S> Collection<T, S>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    S: Schema<T>,
{
    pub fn new(name: impl Into<String>, schema: S) -> Self {
        let name = name.into();
        tracing::info!(name = %name, "collection initializing");
        let collection = Collection {
            name: name.clone(),
            schema: Arc::new(schema),
            live: reactive(Vec::new()),
            readiness: Arc::new(RwLock::new(Readiness::Initializing)),
            warned: Arc::new(Mutex::new(HashSet::new())),
        };
        *collection.readiness.write().unwrap() = Readiness::Ready;
        tracing::info!(name = %collection.name, "collection ready");
        collection
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn schema(&self) -> Arc<S> { self.schema.clone() }

    pub fn readiness(&self) -> Readiness { self.readiness.read().unwrap().clone() }

    /// Emit a one-shot warning (deduplicated by message+operation) when an operation runs
    /// against a non-ready collection. The operation itself is never blocked.
    fn guard_ready(&self, operation: &str) {
        let state = self.readiness.read().unwrap().clone();
        if state == Readiness::Ready {
            return;
        }
        let key = (format!("collection '{}' not ready ({:?})", self.name, state), operation.to_string());
        if self.warned.lock().unwrap().insert(key) {
            tracing::warn!(name = %self.name, operation = %operation, state = ?state, "operation attempted on non-ready collection");
        }
    }

    fn find_index_by_id(docs: &[T], id: &str) -> Option<usize> {
        docs.iter().position(|d| serde_json::to_value(d).ok().and_then(|v| record_id(&v).ok()).as_deref() == Some(id))
    }

    /// Schema-parse `item` and check for a duplicate id, without mutating `docs`.
    pub fn validate_insert(&self, item: Value) -> Result<T, StoreError> {
        let parsed = self.schema.parse(&item)?;
        let id = record_id(&item)?;
        let docs = self.live.get();
        if Self::find_index_by_id(&docs, &id).is_some() {
            return Err(DuplicateIdError { id }.into());
        }
        Ok(parsed)
    }

    /// Never emits on `live()`/filtered views when it returns `Err`.
    pub fn try_insert(&self, item: Value) -> Result<T, StoreError> {
        self.guard_ready("insert");
        let parsed = self.validate_insert(item)?;
        let mut docs = self.live.get();
        docs.push(parsed.clone());
        self.live.set(docs);
        Ok(parsed)
    }

    /// "Throw" in the language-neutral spec maps to "return `Err`", never to `panic!` — this
    /// is the same fallible API as [`Collection::try_insert`], kept as a separate name only
    /// for shape parity with the two-flavour write API the spec describes.
    #[must_use]
    pub fn insert(&self, item: Value) -> Result<T, StoreError> { self.try_insert(item) }

    pub fn try_update(&self, id: &str, patch: Value) -> Result<T, StoreError> {
        self.guard_ready("update");
        let mut docs = self.live.get();
        let idx = Self::find_index_by_id(&docs, id).ok_or_else(|| MissingIdError { id: id.to_string() })?;
        let mut merged = serde_json::to_value(&docs[idx]).map_err(|e| StoreError::Validation(ValidationError::single("$", e.to_string())))?;
        merge_patch(&mut merged, &patch);
        let parsed = self.schema.parse(&merged)?;
        docs[idx] = parsed.clone();
        self.live.set(docs);
        Ok(parsed)
    }

    #[must_use]
    pub fn update(&self, id: &str, patch: Value) -> Result<T, StoreError> { self.try_update(id, patch) }

    pub fn try_delete(&self, id: &str) -> Result<T, StoreError> {
        self.guard_ready("delete");
        let mut docs = self.live.get();
        let idx = Self::find_index_by_id(&docs, id).ok_or_else(|| MissingIdError { id: id.to_string() })?;
        let removed = docs.remove(idx);
        self.live.set(docs);
        Ok(removed)
    }

    #[must_use]
    pub fn delete(&self, id: &str) -> Result<T, StoreError> { self.try_delete(id) }

    /// The live observable view: new subscribers immediately receive the current snapshot.
    pub fn live(&self) -> Reactive<Vec<T>> { self.live.clone() }

    pub fn get_all(&self) -> Vec<T> { self.live.get() }

    /// A derived view whose value is `docs` filtered by `match(doc, filter)`, recomputed on
    /// every `live()` emission. Its upstream subscription (and therefore its membership in
    /// `live`'s subscriber count) is released when its last subscriber unsubscribes, since
    /// it is built with `Reactive::map`.
    pub fn where_(&self, filter_spec: Value) -> Reactive<Vec<T>> {
        self.live.map(move |docs: &Vec<T>| {
            docs.iter()
                .filter(|doc| serde_json::to_value(*doc).map(|v| filter::matches(&v, &filter_spec)).unwrap_or(false))
                .cloned()
                .collect()
        })
    }

    pub fn find(&self, filter_spec: Value) -> Reactive<Vec<T>> { self.where_(filter_spec) }

    /// Non-reactive: the first record matching `filter_spec`, or `None`.
    pub fn find_one(&self, filter_spec: Value) -> Option<T> {
        self.live.get().into_iter().find(|doc| serde_json::to_value(doc).map(|v| filter::matches(&v, &filter_spec)).unwrap_or(false))
    }
}
