//! The migration runner: a versioned-data wrapper and an ordered migration table executed
//! eagerly on collection construction (§4.10).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::collection::Collection;
use crate::error::{MigrationError, StoreError};
use crate::schema::Schema;

#[derive(Debug, Clone)]
pub struct VersionedData<T> {
    pub version: u32,
    pub migrated_at: chrono::DateTime<chrono::Utc>,
    pub data: T,
}

impl<T> VersionedData<T> {
    pub fn new(version: u32, data: T) -> Self { VersionedData { version, migrated_at: chrono::Utc::now(), data } }
}

/// One entry in a [`MigrationTable`]: migrates the whole stored payload (a JSON array of
/// records, per the worked example in the spec) from version `v` to `v + 1`.
pub struct MigrationStep {
    pub migrate: Arc<dyn Fn(Value) -> Value + Send + Sync>,
    pub description: Option<String>,
    pub validate_with: Option<Arc<dyn Schema<Value>>>,
}

impl MigrationStep {
    pub fn new(migrate: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        MigrationStep { migrate: Arc::new(migrate), description: None, validate_with: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_validation(mut self, schema: Arc<dyn Schema<Value>>) -> Self {
        self.validate_with = Some(schema);
        self
    }
}

/// Keyed by source version `v`; entry `v` migrates `v → v+1`.
pub type MigrationTable = HashMap<u32, MigrationStep>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStrategy {
    /// Propagate the first migration failure to the caller.
    Throw,
    /// Record the error, stop early, return `success=false` with the pre-failure data.
    Warn,
    /// Same as `Warn`, with the outcome additionally annotated for the caller's fallback path.
    Fallback,
    /// Run every step but never mutate the caller's data; warnings are prefixed `[DRY RUN]`.
    DryRun,
}

#[derive(Debug, Clone, Copy)]
pub struct MigrationContext {
    pub error_strategy: ErrorStrategy,
}

#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub success: bool,
    pub data: Value,
    pub version: u32,
    pub migrations_applied: Vec<u32>,
    pub errors: Vec<MigrationError>,
    pub warnings: Vec<String>,
}

fn validate_table_complete(table: &MigrationTable, schema_version: u32) -> Result<(), MigrationError> {
    for v in 1..schema_version {
        if !table.contains_key(&v) {
            return Err(MigrationError::MissingStep { from: v, to: v + 1 });
        }
    }
    Ok(())
}

/// Migrate `data` from `from_v` to `to_v` through `table`, honoring `ctx.error_strategy`.
/// Never panics; a `Throw` strategy failure is surfaced to the caller through
/// [`run_migrations_checked`] instead, which wraps this in a `Result`.
pub fn run_migrations(data: Value, from_v: u32, to_v: u32, table: &MigrationTable, ctx: &MigrationContext) -> MigrationOutcome {
    if from_v == to_v {
        return MigrationOutcome { success: true, data, version: to_v, migrations_applied: Vec::new(), errors: Vec::new(), warnings: Vec::new() };
    }
    if from_v > to_v {
        return MigrationOutcome {
            success: false,
            data,
            version: from_v,
            migrations_applied: Vec::new(),
            errors: vec![MigrationError::Backwards { from: from_v, to: to_v }],
            warnings: Vec::new(),
        };
    }

    let dry_run = ctx.error_strategy == ErrorStrategy::DryRun;
    let mut working = data.clone();
    let mut applied = Vec::new();
    let mut errors: Vec<MigrationError> = Vec::new();
    let mut warnings = Vec::new();
    let mut version = from_v;

    for v in from_v..to_v {
        let Some(step) = table.get(&v) else {
            let err = MigrationError::MissingStep { from: v, to: v + 1 };
            warnings.push(if dry_run { format!("[DRY RUN] {err}") } else { err.to_string() });
            errors.push(err);
            break;
        };

        working = (step.migrate)(working);

        if let Some(schema) = &step.validate_with {
            if let Err(source) = schema.parse(&working) {
                let err = MigrationError::ValidationFailed { version: v + 1, source };
                warnings.push(if dry_run { format!("[DRY RUN] {err}") } else { err.to_string() });
                errors.push(err);
                break;
            }
        }

        applied.push(v);
        version = v + 1;
        tracing::info!(from = v, to = v + 1, description = ?step.description, "migration applied");
        if dry_run {
            warnings.push(format!("[DRY RUN] applied migration v{} -> v{}", v, v + 1));
        }
    }

    let success = errors.is_empty();
    MigrationOutcome { success, data: if dry_run { data } else { working }, version, migrations_applied: applied, errors, warnings }
}

/// Like [`run_migrations`], but a `Throw` strategy turns the first recorded error into an
/// actual `Err` instead of a `success: false` outcome.
pub fn run_migrations_checked(data: Value, from_v: u32, to_v: u32, table: &MigrationTable, ctx: &MigrationContext) -> Result<MigrationOutcome, MigrationError> {
    let outcome = run_migrations(data, from_v, to_v, table, ctx);
    if ctx.error_strategy == ErrorStrategy::Throw {
        if let Some(err) = outcome.errors.first() {
            return Err(err.clone());
        }
    }
    Ok(outcome)
}

/// A collection whose initial load runs an eager, fail-fast migration pass before any
/// record is parsed into the underlying [`Collection`].
pub struct CollectionWithMigrations<T, S: Schema<T>>
where
    T: Clone + serde::Serialize + serde::de::DeserializeOwned + Send + Sync + 'static,
{
    pub collection: Collection<T, S>,
    pub schema_version: u32,
    table: Arc<MigrationTable>,
    /// The meta half of `VersionedData` — version plus the timestamp of the migration pass
    /// that produced it. `data` is left empty; the collection's own `docs` is the source of
    /// truth for content, this cell just tracks which version that content is at.
    meta: Arc<RwLock<VersionedData<()>>>,
    last_status: Arc<RwLock<Option<MigrationOutcome>>>,
}

impl<T, S> CollectionWithMigrations<T, S>
where
    T: Clone + serde::Serialize + serde::de::DeserializeOwned + Send + Sync + 'static,
    S: Schema<T>,
{
    pub fn get_current_version(&self) -> u32 { self.meta.read().unwrap().version }

    pub fn get_migration_status(&self) -> Option<MigrationOutcome> { self.last_status.read().unwrap().clone() }

    /// Re-migrate the collection's current snapshot to `target`. `dry_run` runs every step
    /// without replacing the collection's data. On a non-dry-run success, each migrated
    /// record is re-validated against the collection's schema and replaces its prior state.
    pub fn migrate_to_version(&self, target: u32, dry_run: bool) -> Result<MigrationOutcome, StoreError> {
        let from_v = self.get_current_version();
        let ctx = MigrationContext { error_strategy: if dry_run { ErrorStrategy::DryRun } else { ErrorStrategy::Warn } };
        let snapshot = Value::Array(self.collection.get_all().iter().filter_map(|d| serde_json::to_value(d).ok()).collect());
        let outcome = run_migrations(snapshot, from_v, target, &self.table, &ctx);

        if outcome.success && !dry_run {
            if let Value::Array(items) = outcome.data.clone() {
                for item in items {
                    let id = item.get("id").map(|v| v.to_string());
                    if let Some(id) = id.as_deref().map(|s| s.trim_matches('"').to_string()) {
                        if self.collection.find_one(serde_json::json!({"id": id})).is_some() {
                            self.collection.try_update(&id, item)?;
                        } else {
                            self.collection.try_insert(item)?;
                        }
                    }
                }
            }
            *self.meta.write().unwrap() = VersionedData::new(outcome.version, ());
        }

        *self.last_status.write().unwrap() = Some(outcome.clone());
        Ok(outcome)
    }
}

/// Validate the table is complete up to `schema_version` (fail-fast), then eagerly migrate
/// `initial_data` from `initial_version` and load every resulting record into a fresh
/// [`Collection`].
pub fn define_collection_with_migrations<T, S>(
    name: impl Into<String>,
    schema: S,
    schema_version: u32,
    table: MigrationTable,
    initial_data: Vec<Value>,
    initial_version: u32,
) -> Result<CollectionWithMigrations<T, S>, StoreError>
where
    T: Clone + serde::Serialize + serde::de::DeserializeOwned + Send + Sync + 'static,
    S: Schema<T>,
{
    validate_table_complete(&table, schema_version)?;

    let name = name.into();
    let collection = Collection::new(name, schema);

    let initial = VersionedData::new(initial_version, Value::Array(initial_data));
    let (final_data, final_meta) = if initial.version < schema_version {
        let ctx = MigrationContext { error_strategy: ErrorStrategy::Throw };
        let outcome = run_migrations_checked(initial.data, initial.version, schema_version, &table, &ctx)?;
        (outcome.data, VersionedData::new(outcome.version, ()))
    } else {
        (initial.data, VersionedData::new(initial.version, ()))
    };

    if let Value::Array(items) = final_data {
        for item in items {
            collection.insert(item)?;
        }
    }

    Ok(CollectionWithMigrations {
        collection,
        schema_version,
        table: Arc::new(table),
        meta: Arc::new(RwLock::new(final_meta)),
        last_status: Arc::new(RwLock::new(None)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, FieldSpec, JsonSchema};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Account {
        id: String,
        name: String,
        email: String,
        #[serde(rename = "fullName", skip_serializing_if = "Option::is_none")]
        full_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        preferences: Option<Value>,
    }

    fn account_schema() -> JsonSchema<Account> {
        JsonSchema::new(vec![
            FieldSpec::required("id", FieldKind::String),
            FieldSpec::required("name", FieldKind::String),
            FieldSpec::required("email", FieldKind::String),
        ])
    }

    fn sample_table() -> MigrationTable {
        let mut table: MigrationTable = HashMap::new();
        table.insert(
            1,
            MigrationStep::new(|mut data: Value| {
                if let Value::Array(items) = &mut data {
                    for item in items {
                        if let Some(obj) = item.as_object_mut() {
                            let display_name = obj.get("name").cloned().unwrap_or(Value::Null);
                            obj.insert("displayName".to_string(), display_name);
                        }
                    }
                }
                data
            })
            .with_description("add displayName from name"),
        );
        table.insert(
            2,
            MigrationStep::new(|mut data: Value| {
                if let Value::Array(items) = &mut data {
                    for item in items {
                        if let Some(obj) = item.as_object_mut() {
                            if let Some(display_name) = obj.remove("displayName") {
                                obj.insert("fullName".to_string(), display_name);
                            }
                            obj.insert("preferences".to_string(), json!({"theme": "light"}));
                        }
                    }
                }
                data
            })
            .with_description("rename displayName to fullName, default preferences"),
        );
        table
    }

    #[test]
    fn test_migration_chain_v1_to_v3() {
        let data = vec![json!({"id": "1", "name": "Alice", "email": "a@x"})];
        let table = sample_table();
        let ctx = MigrationContext { error_strategy: ErrorStrategy::Throw };
        let outcome = run_migrations(Value::Array(data), 1, 3, &table, &ctx);

        assert!(outcome.success);
        assert_eq!(outcome.version, 3);
        assert_eq!(outcome.migrations_applied, vec![1, 2]);
        let items = outcome.data.as_array().unwrap();
        assert_eq!(items[0]["fullName"], json!("Alice"));
        assert_eq!(items[0]["preferences"], json!({"theme": "light"}));
    }

    #[test]
    fn test_dry_run_never_mutates_caller_data() {
        let data = vec![json!({"id": "1", "name": "Alice", "email": "a@x"})];
        let table = sample_table();
        let ctx = MigrationContext { error_strategy: ErrorStrategy::DryRun };
        let outcome = run_migrations(Value::Array(data.clone()), 1, 3, &table, &ctx);

        assert!(outcome.success);
        assert_eq!(outcome.data, Value::Array(data));
        assert!(outcome.warnings.iter().all(|w| w.starts_with("[DRY RUN]")));
    }

    #[test]
    fn test_gap_in_table_is_rejected_at_construction() {
        let mut incomplete_table: MigrationTable = HashMap::new();
        incomplete_table.insert(1, MigrationStep::new(|d| d));
        // schema_version 3 requires entries for v1 and v2 — v2 is missing.
        let result = define_collection_with_migrations::<Account, _>("accounts", account_schema(), 3, incomplete_table, vec![], 1);
        assert!(result.is_err());
    }
}
