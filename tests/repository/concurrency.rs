//! Per-call isolation under concurrent use of one facade.

use std::sync::Arc;
use std::thread;

use fathom::{
    CallContext, CallOptions, ConsistencyToken, ConsistencyVector, QueryOptions, ScanConsistency,
};

use crate::common::airport_repo;

fn vector(sequence: u64) -> ConsistencyVector {
    ConsistencyVector::from_tokens([ConsistencyToken {
        partition: 0,
        partition_uuid: 1,
        sequence,
    }])
}

#[test]
fn test_concurrent_calls_observe_only_their_own_options() {
    let (repo, client) = airport_repo();
    let repo = Arc::new(repo);

    let threads = 16;
    let mut handles = Vec::with_capacity(threads);
    for i in 0..threads {
        let repo = Arc::clone(&repo);
        handles.push(thread::spawn(move || {
            let ctx = CallContext::new().options(CallOptions::Query(
                QueryOptions::new().consistent_with(vector(i as u64)),
            ));
            repo.find_all_with(&ctx).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let queries = client.recorded_queries();
    assert_eq!(queries.len(), threads);
    // Every statement carries exactly the vector its caller supplied, once.
    let mut sequences: Vec<u64> = queries
        .iter()
        .map(|q| {
            assert_eq!(q.options.scan_consistency, Some(ScanConsistency::AtPlus));
            q.options.consistent_with.as_ref().unwrap().0[0].sequence
        })
        .collect();
    sequences.sort_unstable();
    assert_eq!(sequences, (0..threads as u64).collect::<Vec<_>>());
}

#[test]
fn test_concurrent_derived_facades_route_independently() {
    let (repo, client) = airport_repo();
    let repo = Arc::new(repo);

    let subs = ["airport", "route", "hotel", "landmark"];
    let mut handles = Vec::new();
    for sub in subs {
        let scoped = repo.with_sub_namespace(sub);
        handles.push(thread::spawn(move || {
            scoped.find_all().unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let mut seen: Vec<String> = client
        .recorded_queries()
        .iter()
        .map(|q| q.keyspace.sub_namespace.as_ref().unwrap().as_str().to_string())
        .collect();
    seen.sort();
    let mut expected: Vec<String> = subs.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(seen, expected);
}
