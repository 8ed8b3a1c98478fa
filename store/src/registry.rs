//! Process-wide collection/schema registry (§5, §9): a pair of `name → Collection` and
//! `name → Schema` maps, realized here as a single type-erased `dashmap` so the facade
//! stays `Send + Sync` without a caller-visible lock. Re-registration under the same name
//! replaces the registry entry; subscribers already bound to the prior instance keep seeing
//! only that instance, since they hold their own clone of its `Reactive`.

use std::any::Any;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::collection::Collection;
use crate::schema::Schema;

type AnyCollection = Arc<dyn Any + Send + Sync>;

fn registry() -> &'static DashMap<String, AnyCollection> { static REGISTRY: OnceLock<DashMap<String, AnyCollection>> = OnceLock::new(); REGISTRY.get_or_init(DashMap::new) }

pub(crate) fn register<T, S>(name: &str, collection: &Collection<T, S>)
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    S: Schema<T> + 'static,
{
    registry().insert(name.to_string(), Arc::new(collection.clone()));
}

/// Register a freshly constructed collection under `name` and return it.
pub fn define_collection<T, S>(name: impl Into<String>, schema: S) -> Collection<T, S>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    S: Schema<T> + 'static,
{
    let name = name.into();
    let collection = Collection::new(name.clone(), schema);
    register(&name, &collection);
    collection
}

pub fn get_collection<T, S>(name: &str) -> Option<Collection<T, S>>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    S: Schema<T> + 'static,
{
    registry().get(name).and_then(|entry| entry.value().clone().downcast::<Collection<T, S>>().ok()).map(|arc| (*arc).clone())
}

pub fn get_schema<T, S>(name: &str) -> Option<Arc<S>>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    S: Schema<T> + 'static,
{
    get_collection::<T, S>(name).map(|c| c.schema())
}
