//! Public facade: re-exports the reactive engine (`reactive_signals`) and the
//! schema-validated collection store (`reactive_store`) under the single surface the
//! language-neutral API describes — `reactive(initial)`, the operator library,
//! `define_collection`/`define_collection_with_migrations`, `get_collection`/`get_schema` —
//! plus an optional diagnostics snapshot observable (§2 item 9) over both subsystems'
//! live subscriber counts.

pub use reactive_signals::{
    catch_error, combine_latest, concat_map, delay, merge_map, pairwise, reactive, retry, sample, scan, start_with, switch_map, tap, take_while, with_latest_from, zip, AdapterError, Broadcast,
    IntoListener, Listener, ListenerGuard, Multicast, Observable, ObservableLike, Operator, OperatorError, Reactive, Share, Subscription,
};

pub use reactive_store::{
    define_collection, define_collection_with_migrations, get_collection, get_schema, run_migrations, run_migrations_checked, Collection, CollectionWithMigrations, DuplicateIdError,
    ErrorStrategy, FieldKind, FieldSpec, JsonSchema, MigrationContext, MigrationError, MigrationOutcome, MigrationStep, MigrationTable, MissingIdError, Readiness, Schema, StoreError,
    ValidationError, ValidationIssue, VersionedData,
};

pub mod diagnostics;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
    struct Order {
        id: String,
        total: i64,
    }

    fn order_schema() -> JsonSchema<Order> { JsonSchema::new(vec![FieldSpec::required("id", FieldKind::String), FieldSpec::required("total", FieldKind::Int)]) }

    #[test]
    fn test_scan_over_a_collections_live_view_counts_docs() {
        let orders = Collection::new("orders_facade_test", order_schema());
        let running_count = scan(&orders.live(), |_acc: &usize, docs: &Vec<Order>| docs.len(), 0usize);

        orders.insert(json!({"id": "1", "total": 10})).unwrap();
        orders.insert(json!({"id": "2", "total": 20})).unwrap();

        assert_eq!(running_count.get(), 2);
    }

    #[test]
    fn test_combine_latest_across_two_collections() {
        let buyers = Collection::new("buyers_facade_test", order_schema());
        let sellers = Collection::new("sellers_facade_test", order_schema());

        let combined = combine_latest(&buyers.live(), &sellers.live());
        assert_eq!(combined.get(), Some((Vec::new(), Vec::new())));

        buyers.insert(json!({"id": "1", "total": 5})).unwrap();
        let (b, s) = combined.get().unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(s.len(), 0);
    }
}
