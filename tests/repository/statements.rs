//! Statement rendering, options merging and keyspace routing through the
//! facade.

use serde_json::json;
use std::time::Duration;

use fathom::{
    CallContext, CallOptions, Criteria, Error, NamespaceSpec, Order, Query, QueryOptions, Sort,
};

use crate::common::{airport_doc, airport_repo};

#[test]
fn test_filtered_find_renders_positional_statement() {
    let (repo, client) = airport_repo();
    repo.find_all_query(Query::query(Criteria::eq("iata", "JFK")).limit(2))
        .unwrap();
    let queries = client.recorded_queries();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].statement.ends_with("AND iata = $1 LIMIT 2"));
    assert_eq!(
        queries[0].options.positional_parameters,
        Some(vec![json!("JFK")])
    );
}

#[test]
fn test_unscoped_statement_targets_bare_store() {
    let (repo, client) = airport_repo();
    repo.find_all().unwrap();
    let statement = &client.recorded_queries()[0].statement;
    assert!(statement.starts_with(
        "SELECT META(d).id AS __id, META(d).cas AS __cas, d.* FROM `travel` d"
    ));
    assert!(statement.contains("d.`_type` = \"Airport\""));
}

#[test]
fn test_scoped_statement_targets_full_keyspace_path() {
    let (repo, client) = airport_repo();
    repo.with_namespace("inventory")
        .with_sub_namespace("airport")
        .find_all()
        .unwrap();
    let statement = &client.recorded_queries()[0].statement;
    assert!(statement.contains("FROM `travel`.`inventory`.`airport` d"));
}

#[test]
fn test_unsupported_sort_fails_before_any_statement_runs() {
    let (repo, client) = airport_repo();
    let query = Query::new().with_sort(Sort::by([Order::desc("name").ignore_case()]));
    let err = repo.find_all_query(query).unwrap_err();
    assert!(matches!(err, Error::UnsupportedSort { .. }));
    assert!(client.recorded_queries().is_empty());
}

#[test]
fn test_namespace_mismatch_fails_before_any_statement_runs() {
    let (repo, client) = airport_repo();
    let query = Query::new().within_namespace(NamespaceSpec::with_members("inventory", ["valid"]));
    let scoped = repo.with_sub_namespace("bogus");
    let err = scoped.find_all_query(query).unwrap_err();
    assert!(matches!(err, Error::NamespaceMismatch { .. }));
    assert!(client.recorded_queries().is_empty());
}

#[test]
fn test_per_call_options_merge_over_overlay_options() {
    let (repo, client) = airport_repo();
    let scoped = repo.with_options(CallOptions::Query(
        QueryOptions::new()
            .metrics(true)
            .timeout(Duration::from_secs(3)),
    ));
    // An explicit per-call context replaces the overlay's options slot
    // outright; fields the caller leaves unset are simply unset.
    let ctx = CallContext::new().options(CallOptions::Query(
        QueryOptions::new().timeout(Duration::from_secs(9)),
    ));
    scoped.find_all_with(&ctx).unwrap();
    let options = &client.recorded_queries()[0].options;
    assert_eq!(options.timeout, Some(Duration::from_secs(9)));
    assert_eq!(options.metrics, None);
}

#[test]
fn test_query_options_merge_with_per_call_options() {
    let (repo, client) = airport_repo();
    let query = Query::new().with_options(
        QueryOptions::new()
            .metrics(true)
            .timeout(Duration::from_secs(3)),
    );
    let ctx = CallContext::new().options(CallOptions::Query(
        QueryOptions::new().timeout(Duration::from_secs(9)),
    ));
    repo.find_all_query_with(query, &ctx).unwrap();
    let options = &client.recorded_queries()[0].options;
    // Per-call field wins, untouched query field survives.
    assert_eq!(options.timeout, Some(Duration::from_secs(9)));
    assert_eq!(options.metrics, Some(true));
}

#[test]
fn test_count_parses_count_row() {
    let (repo, client) = airport_repo();
    client.canned_rows(vec![json!({ "__count": 12 })]);
    assert_eq!(repo.count().unwrap(), 12);
    let statement = &client.recorded_queries()[0].statement;
    assert!(statement.starts_with("SELECT COUNT(*) AS __count FROM `travel` d"));
}

#[test]
fn test_count_without_count_row_is_a_store_error() {
    let (repo, _) = airport_repo();
    let err = repo.count().unwrap_err();
    assert!(matches!(err, Error::Store { .. }));
}

#[test]
fn test_delete_all_counts_returned_rows() {
    let (repo, client) = airport_repo();
    client.canned_rows(vec![
        json!({ "id": "airport::jfk" }),
        json!({ "id": "airport::sfo" }),
    ]);
    assert_eq!(repo.delete_all().unwrap(), 2);
    let statement = &client.recorded_queries()[0].statement;
    assert!(statement.starts_with("DELETE FROM `travel` d"));
    assert!(statement.ends_with("RETURNING META(d).id"));
}

#[test]
fn test_find_all_decodes_rows() {
    let (repo, client) = airport_repo();
    client.canned_rows(vec![
        airport_doc("airport::jfk", "JFK"),
        airport_doc("airport::sfo", "SFO"),
    ]);
    let found = repo.find_all().unwrap();
    let iatas: Vec<_> = found.iter().map(|a| a.iata.as_str()).collect();
    assert_eq!(iatas, ["JFK", "SFO"]);
}

#[test]
fn test_rendering_is_stable_across_repeated_calls() {
    let (repo, client) = airport_repo();
    let query = Query::query(Criteria::eq("iata", "JFK")).limit(2);
    repo.find_all_query(query.clone()).unwrap();
    repo.find_all_query(query).unwrap();
    let queries = client.recorded_queries();
    assert_eq!(queries[0].statement, queries[1].statement);
    assert_eq!(queries[0].options, queries[1].options);
}
