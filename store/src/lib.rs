//! A schema-validated, reactive in-memory collection store: validated CRUD over named
//! collections, live and filtered query observables built on `reactive_signals`, and a
//! versioned migration runner executed eagerly on collection load.

pub mod collection;
pub mod error;
pub mod filter;
pub mod migration;
pub mod registry;
pub mod schema;

pub use collection::{Collection, Readiness};
pub use error::{DuplicateIdError, MigrationError, MissingIdError, StoreError, ValidationError, ValidationIssue};
pub use migration::{
    define_collection_with_migrations, run_migrations, run_migrations_checked, CollectionWithMigrations, ErrorStrategy, MigrationContext, MigrationOutcome, MigrationStep, MigrationTable,
    VersionedData,
};
pub use registry::{define_collection, get_collection, get_schema};
pub use schema::{FieldKind, FieldSpec, JsonSchema, Schema};
