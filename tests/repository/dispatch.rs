//! Typed and dynamic dispatch through the facade.

use std::time::Duration;

use serde_json::json;

use fathom::{
    CallArg, CallContext, CallOptions, Error, Output, PendingCall, QueryOptions, WriteOptions,
};

use crate::common::{airport_doc, airport_repo, Airport};

// ==================== save-mode selection ====================

#[test]
fn test_save_without_version_upserts() {
    let (repo, client) = airport_repo();
    repo.save(&Airport::new("airport::jfk", "JFK")).unwrap();
    let mutations = client.recorded_mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!(mutations[0].kind, "upsert");
    assert_eq!(mutations[0].options.cas, None);
}

#[test]
fn test_save_with_version_replaces_with_cas() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    repo.save(&Airport::new("airport::jfk", "JFK").versioned(7))
        .unwrap();
    let mutations = client.recorded_mutations();
    assert_eq!(mutations[0].kind, "replace");
    assert_eq!(mutations[0].options.cas, Some(7));
}

#[test]
fn test_save_with_zero_version_upserts() {
    let (repo, client) = airport_repo();
    repo.save(&Airport::new("airport::jfk", "JFK").versioned(0))
        .unwrap();
    assert_eq!(client.recorded_mutations()[0].kind, "upsert");
}

#[test]
fn test_explicit_replace_bundle_forces_replace() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    let ctx = CallContext::new().options(CallOptions::Replace(WriteOptions::new().cas(3)));
    repo.save_with(&Airport::new("airport::jfk", "JFK"), &ctx)
        .unwrap();
    let mutations = client.recorded_mutations();
    assert_eq!(mutations[0].kind, "replace");
    assert_eq!(mutations[0].options.cas, Some(3));
}

#[test]
fn test_save_with_query_bundle_fails_both_probes() {
    let (repo, _) = airport_repo();
    let ctx = CallContext::new().options(CallOptions::Query(QueryOptions::new()));
    let err = repo
        .save_with(&Airport::new("airport::jfk", "JFK"), &ctx)
        .unwrap_err();
    match err {
        Error::NoSuchOperation { method, probes } => {
            assert_eq!(method, "save");
            assert_eq!(probes.len(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_save_all_saves_in_order() {
    let (repo, client) = airport_repo();
    let entities = vec![
        Airport::new("airport::jfk", "JFK"),
        Airport::new("airport::sfo", "SFO"),
    ];
    let tokens = repo.save_all(&entities).unwrap();
    assert_eq!(tokens.len(), 2);
    let ids: Vec<_> = client
        .recorded_mutations()
        .iter()
        .map(|m| m.id.clone())
        .collect();
    assert_eq!(ids, ["airport::jfk", "airport::sfo"]);
}

// ==================== reads and deletes ====================

#[test]
fn test_find_by_id_round_trips_through_mapper() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    let found = repo.find_by_id("airport::jfk").unwrap().unwrap();
    assert_eq!(found, Airport::new("airport::jfk", "JFK"));
    assert!(repo.find_by_id("airport::lhr").unwrap().is_none());
}

#[test]
fn test_find_all_by_id_skips_missing() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    let found = repo
        .find_all_by_id(&["airport::jfk".into(), "airport::lhr".into()])
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].iata, "JFK");
}

#[test]
fn test_find_by_id_forwards_per_call_options_to_client() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    let ctx = CallContext::new().options(CallOptions::Query(
        QueryOptions::new().timeout(Duration::from_secs(9)),
    ));
    repo.find_by_id_with("airport::jfk", &ctx).unwrap();
    let lookups = client.recorded_lookups();
    assert_eq!(lookups.len(), 1);
    assert_eq!(lookups[0].kind, "get");
    assert_eq!(lookups[0].options.timeout, Some(Duration::from_secs(9)));
}

#[test]
fn test_exists_by_id_forwards_overlay_options_to_client() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    let scoped = repo.with_options(CallOptions::Query(
        QueryOptions::new().timeout(Duration::from_secs(4)),
    ));
    assert!(scoped.exists_by_id("airport::jfk").unwrap());
    let lookups = client.recorded_lookups();
    assert_eq!(lookups[0].kind, "exists");
    assert_eq!(lookups[0].options.timeout, Some(Duration::from_secs(4)));
}

#[test]
fn test_delete_missing_document_surfaces_store_error() {
    let (repo, _) = airport_repo();
    let err = repo.delete_by_id("airport::nope").unwrap_err();
    assert!(matches!(err, Error::DocumentNotFound { .. }));
}

#[test]
fn test_delete_by_entity_uses_its_id() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    repo.delete(&Airport::new("airport::jfk", "JFK")).unwrap();
    assert!(client.stored("airport::jfk").is_none());
}

#[test]
fn test_delete_all_entities_removes_each_by_id() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    client.seed("airport::sfo", airport_doc("airport::sfo", "SFO"));
    repo.delete_all_entities(&[
        Airport::new("airport::jfk", "JFK"),
        Airport::new("airport::sfo", "SFO"),
    ])
    .unwrap();
    assert!(client.stored("airport::jfk").is_none());
    assert!(client.stored("airport::sfo").is_none());
}

// ==================== dynamic path ====================

#[test]
fn test_invoke_find_by_id() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    let call = PendingCall::new("find_by_id").arg(CallArg::Value(json!("airport::jfk")));
    let output = repo.invoke(&call).unwrap();
    assert_eq!(
        output,
        Output::MaybeEntity(Some(airport_doc("airport::jfk", "JFK")))
    );
}

#[test]
fn test_invoke_save_dispatches_by_version() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    let mut versioned = airport_doc("airport::jfk", "JFK");
    versioned["version"] = json!(5);
    let call = PendingCall::new("save").arg(CallArg::Value(versioned));
    let output = repo.invoke(&call).unwrap();
    assert!(matches!(output, Output::Version(_)));
    assert_eq!(client.recorded_mutations()[0].kind, "replace");
}

#[test]
fn test_invoke_explicit_sub_namespace_wins_over_overlay() {
    let (repo, client) = airport_repo();
    let scoped = repo.with_sub_namespace("airport");
    let call = PendingCall::new("find_all").arg(CallArg::SubNamespace("route".into()));
    scoped.invoke(&call).unwrap();
    let queries = client.recorded_queries();
    assert_eq!(
        queries[0]
            .keyspace
            .sub_namespace
            .as_ref()
            .unwrap()
            .as_str(),
        "route"
    );
}

#[test]
fn test_invoke_overlay_fills_missing_context() {
    let (repo, client) = airport_repo();
    let scoped = repo.with_sub_namespace("airport");
    scoped.invoke(&PendingCall::new("find_all")).unwrap();
    let keyspace = &client.recorded_queries()[0].keyspace;
    // Namespace falls back to the client connection's current namespace.
    assert_eq!(keyspace.namespace.as_ref().unwrap().as_str(), "inventory");
    assert_eq!(keyspace.sub_namespace.as_ref().unwrap().as_str(), "airport");
}

#[test]
fn test_invoke_null_before_sub_namespace_drops_overlay_options() {
    let (repo, client) = airport_repo();
    let scoped = repo.with_options(CallOptions::Query(QueryOptions::new().metrics(true)));
    let call = PendingCall::new("find_all")
        .arg(CallArg::Null)
        .arg(CallArg::SubNamespace("airport".into()));
    scoped.invoke(&call).unwrap();
    // The explicit empty options slot suppresses the overlay's bundle.
    assert_eq!(client.recorded_queries()[0].options.metrics, None);
}

#[test]
fn test_invoke_rejects_overlay_mutators() {
    let (repo, _) = airport_repo();
    let err = repo.invoke(&PendingCall::new("with_namespace")).unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }));
}

#[test]
fn test_invoke_unknown_operation() {
    let (repo, _) = airport_repo();
    let err = repo.invoke(&PendingCall::new("explode")).unwrap_err();
    assert!(matches!(err, Error::NoSuchOperation { .. }));
}

#[test]
fn test_invoke_delete_all_by_id() {
    let (repo, client) = airport_repo();
    client.seed("airport::jfk", airport_doc("airport::jfk", "JFK"));
    client.seed("airport::sfo", airport_doc("airport::sfo", "SFO"));
    let call =
        PendingCall::new("delete_all_by_id").arg(CallArg::Value(json!(["airport::jfk", "airport::sfo"])));
    assert_eq!(repo.invoke(&call).unwrap(), Output::Unit);
    assert!(client.stored("airport::jfk").is_none());
    assert!(client.stored("airport::sfo").is_none());
}
