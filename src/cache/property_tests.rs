//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key normalization, subscriber accounting,
//! deduplication and tag matching over generated inputs.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheKey, CacheStore, StoreConfig, Subscription};
use crate::endpoint::{intersects, EndpointDescriptor, EndpointRegistry, RequestSpec, Tag, TagSet};
use crate::executor::RequestExecutor;
use crate::transport::mock::MockTransport;

// == Test Configuration ==
const PAGES: u32 = 3;

fn build_page(args: &Value) -> std::result::Result<RequestSpec, String> {
    let page = args.get("page").and_then(Value::as_u64).ok_or("page")?;
    Ok(RequestSpec::get(format!("/page/{}", page)))
}

fn test_store(transport: Arc<MockTransport>) -> CacheStore {
    let mut registry = EndpointRegistry::new();
    registry
        .register(EndpointDescriptor::query("page", build_page))
        .unwrap();
    CacheStore::new(
        registry.into_shared(),
        RequestExecutor::new(transport),
        StoreConfig::default(),
    )
}

// == Strategies ==
/// Generates flat argument objects as field lists
fn fields_strategy() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::hash_map("[a-z]{1,8}", any::<i64>(), 0..8)
        .prop_map(|map| map.into_iter().collect())
}

fn tag_strategy() -> impl Strategy<Value = Tag> {
    prop_oneof![
        Just(Tag::Etudiants),
        (0u8..5).prop_map(|id| Tag::etudiant(id.to_string())),
    ]
}

fn tag_set_strategy() -> impl Strategy<Value = TagSet> {
    prop::collection::btree_set(tag_strategy(), 0..4)
}

/// Subscription operations for testing bookkeeping
#[derive(Debug, Clone)]
enum SubOp {
    Subscribe { page: u32 },
    Unsubscribe { index: usize },
    Drop { index: usize },
}

fn sub_op_strategy() -> impl Strategy<Value = SubOp> {
    prop_oneof![
        (1..=PAGES).prop_map(|page| SubOp::Subscribe { page }),
        any::<usize>().prop_map(|index| SubOp::Unsubscribe { index }),
        any::<usize>().prop_map(|index| SubOp::Drop { index }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Equal args map to one key, whatever order their fields were built in.
    #[test]
    fn prop_key_ignores_field_order(fields in fields_strategy()) {
        let forward: Map<String, Value> =
            fields.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
        let backward: Map<String, Value> =
            fields.iter().rev().map(|(k, v)| (k.clone(), json!(v))).collect();
        let nested_a = json!({"outer": Value::Object(forward.clone()), "x": 1});
        let nested_b = json!({"x": 1, "outer": Value::Object(backward.clone())});

        prop_assert_eq!(
            CacheKey::new("q", &Value::Object(forward)),
            CacheKey::new("q", &Value::Object(backward))
        );
        prop_assert_eq!(CacheKey::new("q", &nested_a), CacheKey::new("q", &nested_b));
    }

    // Different values for the same field never collide.
    #[test]
    fn prop_key_distinguishes_values(a in any::<i64>(), b in any::<i64>()) {
        prop_assume!(a != b);
        prop_assert_ne!(
            CacheKey::new("q", &json!({"page": a})),
            CacheKey::new("q", &json!({"page": b}))
        );
    }

    // Tag matching is symmetric and agrees with set intersection.
    #[test]
    fn prop_tag_intersection(a in tag_set_strategy(), b in tag_set_strategy()) {
        let expected = a.intersection(&b).next().is_some();
        prop_assert_eq!(intersects(&a, &b), expected);
        prop_assert_eq!(intersects(&b, &a), expected);
    }

    // subscriber_count always equals the number of live subscriptions per key,
    // however often handles are unsubscribed or dropped.
    #[test]
    fn prop_subscriber_count_matches_live_handles(ops in prop::collection::vec(sub_op_strategy(), 1..40)) {
        tokio_test::block_on(async {
            let transport = Arc::new(MockTransport::new());
            for page in 1..=PAGES {
                transport.respond_json(&format!("/page/{}", page), json!({"page": page}));
            }
            let store = test_store(transport);
            let mut handles: Vec<Option<(u32, Subscription)>> = Vec::new();

            for op in ops {
                match op {
                    SubOp::Subscribe { page } => {
                        let (sub, _watch) = store.subscribe("page", json!({"page": page})).unwrap();
                        handles.push(Some((page, sub)));
                    }
                    SubOp::Unsubscribe { index } if !handles.is_empty() => {
                        let i = index % handles.len();
                        if let Some((_, sub)) = &handles[i] {
                            store.unsubscribe(sub);
                            store.unsubscribe(sub);
                        }
                    }
                    SubOp::Drop { index } if !handles.is_empty() => {
                        let i = index % handles.len();
                        handles[i] = None;
                    }
                    _ => {}
                }
            }

            let mut live: HashMap<u32, usize> = HashMap::new();
            for (page, sub) in handles.iter().flatten() {
                if sub.is_active() {
                    *live.entry(*page).or_default() += 1;
                }
            }
            for page in 1..=PAGES {
                let key = CacheKey::new("page", &json!({"page": page}));
                let count = store.peek(&key).map_or(0, |e| e.subscriber_count);
                assert_eq!(count, live.get(&page).copied().unwrap_or(0), "page {}", page);
            }
        });
    }

    // Any number of subscribers arriving while a fetch is in flight share one
    // transport call and observe the same data.
    #[test]
    fn prop_concurrent_subscribers_share_one_call(n in 1usize..12) {
        tokio_test::block_on(async {
            let transport = Arc::new(MockTransport::gated());
            transport.respond_json("/page/1", json!({"rows": [1, 2, 3]}));
            let store = test_store(transport.clone());

            let mut subs = Vec::new();
            for _ in 0..n {
                subs.push(store.subscribe("page", json!({"page": 1})).unwrap());
            }
            transport.wait_for_calls(1).await;
            transport.release();

            for (_sub, watch) in subs.iter_mut() {
                let entry = watch.settled().await.unwrap();
                assert_eq!(entry.data, Some(json!({"rows": [1, 2, 3]})));
            }
            assert_eq!(transport.calls().len(), 1);
        });
    }
}
