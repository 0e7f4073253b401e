// End-to-end executor tests against the in-memory data source.

use std::sync::Arc;
use std::time::Duration;

use searchql::testing::MemorySource;
use searchql::{
    BeanDescriptor, DataSourceRegistry, FieldDescriptor, ScalarKind, SearchError,
    SearchQueryPackage, SqlExecutor, StorageKind, TypeShape, Value,
};

const LIST_SQL: &str = "SELECT id, name FROM user WHERE age > ?";
const CLUSTER_SQL: &str = "SELECT COUNT(*) AS total FROM user WHERE age > ?";

fn user_bean() -> Arc<BeanDescriptor> {
    Arc::new(BeanDescriptor::new("User", vec![
        FieldDescriptor::new("id", "id", StorageKind::Plain,
            TypeShape::Scalar(ScalarKind::Int)),
        FieldDescriptor::new("name", "name", StorageKind::Plain,
            TypeShape::Scalar(ScalarKind::String)),
    ]))
}

fn setup() -> (MemorySource, Arc<DataSourceRegistry>) {
    let source = MemorySource::new();
    let registry = Arc::new(DataSourceRegistry::new());
    registry.set_default(Arc::new(source.clone()));
    (source, registry)
}

fn full_package() -> SearchQueryPackage {
    SearchQueryPackage::new(user_bean())
        .with_list_query(LIST_SQL, vec![Value::Integer(18)])
        .with_cluster_query(CLUSTER_SQL, vec![Value::Integer(18)])
}

#[test]
fn test_noop_request_acquires_no_connection() {
    let (source, registry) = setup();
    let executor = SqlExecutor::new(registry);
    let result = executor.execute(&SearchQueryPackage::new(user_bean())).unwrap();
    assert!(result.is_closed());
    assert_eq!(source.connections_opened(), 0);
}

#[test]
fn test_list_and_cluster_execution() {
    let (source, registry) = setup();
    source.set_rows(LIST_SQL, vec![
        vec![("id", Value::Integer(1)), ("name", Value::Text("Jack".to_string()))],
        vec![("id", Value::Integer(2)), ("name", Value::Text("Tom".to_string()))],
    ]);
    source.set_rows(CLUSTER_SQL, vec![
        vec![("total", Value::Integer(2))],
    ]);

    let executor = SqlExecutor::new(registry);
    let mut result = executor.execute(&full_package()).unwrap();

    assert!(result.next().unwrap());
    assert_eq!(result.get("id").unwrap(), Value::Integer(1));
    assert_eq!(result.get("name").unwrap(), Value::Text("Jack".to_string()));
    assert!(result.next().unwrap());
    assert_eq!(result.get("id").unwrap(), Value::Integer(2));
    assert!(!result.next().unwrap());

    assert_eq!(result.cluster_get("total").unwrap(), Value::Integer(2));

    result.close().unwrap();
    assert_eq!(source.connections_opened(), 1);
    assert_eq!(source.connections_closed(), 1);
}

#[test]
fn test_close_is_idempotent() {
    let (source, registry) = setup();
    source.set_rows(LIST_SQL, vec![]);
    let executor = SqlExecutor::new(registry);
    let mut result = executor
        .execute(&SearchQueryPackage::new(user_bean())
            .with_list_query(LIST_SQL, vec![]))
        .unwrap();
    result.close().unwrap();
    result.close().unwrap();
    drop(result);
    assert_eq!(source.connections_opened(), 1);
    assert_eq!(source.connections_closed(), 1);
}

#[test]
fn test_drop_releases_the_connection() {
    let (source, registry) = setup();
    let executor = SqlExecutor::new(registry);
    let result = executor
        .execute(&SearchQueryPackage::new(user_bean())
            .with_list_query(LIST_SQL, vec![]))
        .unwrap();
    drop(result);
    assert_eq!(source.connections_closed(), 1);
}

#[test]
fn test_named_lookup_never_falls_back_to_default() {
    let (_, registry) = setup();
    let bean = Arc::new(
        BeanDescriptor::new("User", vec![]).with_data_source("reports"),
    );
    let executor = SqlExecutor::new(registry);
    let package = SearchQueryPackage::new(bean).with_list_query(LIST_SQL, vec![]);
    let err = executor.execute(&package).unwrap_err();
    assert!(matches!(err, SearchError::Connection(_)));
    assert!(err.to_string().contains("reports"));
}

#[test]
fn test_cluster_query_without_row_reads_null() {
    let (_, registry) = setup();
    let executor = SqlExecutor::new(registry);
    let mut result = executor
        .execute(&SearchQueryPackage::new(user_bean())
            .with_cluster_query(CLUSTER_SQL, vec![Value::Integer(18)]))
        .unwrap();
    // no aggregate row is a valid, fully-null result, not a failure
    assert_eq!(result.cluster_get("total").unwrap(), Value::Null);
    assert_eq!(result.cluster_get("max_age").unwrap(), Value::Null);
    result.close().unwrap();
}

#[test]
fn test_transactional_snapshot_consistency() {
    let (source, registry) = setup();
    source.register_counter_query(LIST_SQL);
    source.register_counter_query(CLUSTER_SQL);
    source.set_counter(5);

    let mut executor = SqlExecutor::new(registry);
    executor.set_transactional(true);
    let mut result = executor.execute(&full_package()).unwrap();

    assert!(result.next().unwrap());
    let list_seen = result.get("cnt").unwrap();
    let cluster_seen = result.cluster_get("cnt").unwrap();
    // both queries observe the same snapshot
    assert_eq!(list_seen, Value::Integer(5));
    assert_eq!(cluster_seen, Value::Integer(5));
    result.close().unwrap();
}

#[test]
fn test_non_transactional_queries_see_interleaved_changes() {
    let (source, registry) = setup();
    source.register_counter_query(LIST_SQL);
    source.register_counter_query(CLUSTER_SQL);
    source.set_counter(5);

    let executor = SqlExecutor::new(registry);
    let mut result = executor.execute(&full_package()).unwrap();

    assert!(result.next().unwrap());
    assert_eq!(result.get("cnt").unwrap(), Value::Integer(5));
    // the list execution bumped the counter before the cluster query ran
    assert_eq!(result.cluster_get("cnt").unwrap(), Value::Integer(6));
    result.close().unwrap();
}

#[test]
fn test_execution_failure_closes_the_connection() {
    let (source, registry) = setup();
    source.fail_execute(LIST_SQL);
    let executor = SqlExecutor::new(registry);
    let err = executor.execute(&full_package()).unwrap_err();
    assert!(matches!(err, SearchError::Execution(_)));
    assert_eq!(source.connections_opened(), 1);
    assert_eq!(source.connections_closed(), 1);
}

#[test]
fn test_commit_failure_surfaces_when_queries_succeeded() {
    let (source, registry) = setup();
    source.set_rows(LIST_SQL, vec![]);
    source.set_rows(CLUSTER_SQL, vec![]);
    source.fail_commit();

    let mut executor = SqlExecutor::new(registry);
    executor.set_transactional(true);
    let err = executor.execute(&full_package()).unwrap_err();
    assert!(err.to_string().contains("Commit failed"));
    assert_eq!(source.connections_closed(), 1);
}

#[test]
fn test_execution_failure_is_not_masked_by_commit_failure() {
    let (source, registry) = setup();
    source.fail_execute(LIST_SQL);
    source.fail_commit();

    let mut executor = SqlExecutor::new(registry);
    executor.set_transactional(true);
    let err = executor.execute(&full_package()).unwrap_err();
    assert!(err.to_string().contains(LIST_SQL));
    assert!(!err.to_string().contains("Commit failed"));
    assert_eq!(source.connections_closed(), 1);
}

#[test]
fn test_list_cursor_close_failure_still_releases_everything() {
    let (source, registry) = setup();
    source.set_rows(LIST_SQL, vec![]);
    source.set_rows(CLUSTER_SQL, vec![vec![("total", Value::Integer(0))]]);
    source.fail_cursor_close(LIST_SQL);

    let executor = SqlExecutor::new(registry);
    let mut result = executor.execute(&full_package()).unwrap();
    let err = result.close().unwrap_err();
    assert!(matches!(err, SearchError::Cleanup(_)));
    // the cluster cursor and the connection were still closed
    assert_eq!(source.connections_closed(), 1);
    // second close reports nothing new
    assert!(result.close().is_ok());
}

#[test]
fn test_slow_threshold_zero_marks_everything_slow() {
    // elapsed >= threshold with threshold zero: the observation path runs
    // for every statement; this exercises it without timing assumptions
    let (source, registry) = setup();
    source.set_rows(LIST_SQL, vec![]);
    let mut executor = SqlExecutor::new(registry);
    executor.set_slow_sql_threshold(Duration::ZERO);
    let mut result = executor
        .execute(&SearchQueryPackage::new(user_bean())
            .with_list_query(LIST_SQL, vec![Value::Integer(18)]))
        .unwrap();
    result.close().unwrap();
}
