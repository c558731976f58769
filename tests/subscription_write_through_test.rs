//! Integration tests for subscription updates written through the cache
//!
//! Test coverage:
//! - Single and list entries reflect the server's response after an update
//! - Lists of other organizations and missing lists are left alone
//! - Failed updates leave every entry unchanged
//! - Dropping the caller's future does not skip the write-through
//! - Change events are published only after every entry was written

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{client, product, subscription, FakeCommerceApi};
use storefront_cache::domain::models::{ListSubscriptionsParams, Pagination, SubscriptionStatus};
use storefront_cache::{
    CacheEvent, DomainError, QueryData, QueryKey, ResourceKind, SubscriptionService,
    SubscriptionUpdate,
};

fn seeded_api() -> Arc<FakeCommerceApi> {
    Arc::new(
        FakeCommerceApi::new()
            .with_subscription(subscription("s1", "org_1", SubscriptionStatus::Active))
            .with_subscription(subscription("s2", "org_1", SubscriptionStatus::Active))
            .with_subscription(subscription("s9", "org_2", SubscriptionStatus::Active))
            .with_product(product("prod_pro", "org_1")),
    )
}

#[tokio::test]
async fn test_revoke_updates_single_and_list_entries() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));
    let service = &client.subscriptions;

    let list = service
        .list("org_1", &ListSubscriptionsParams::default())
        .await
        .expect("list loads");
    assert_eq!(list.len(), 2);
    service.get("s1").await.expect("single loads");

    let updated = service
        .update("s1", SubscriptionUpdate::revoke(None, None))
        .await
        .expect("update succeeds");
    assert_eq!(updated.status, SubscriptionStatus::Canceled);

    // Reads are served from the cache, not refetched
    let list_calls = api.calls("list_subscriptions");
    let get_calls = api.calls("get_subscription");

    let single = service.get("s1").await.expect("single still cached");
    assert_eq!(single, updated);

    let list = service
        .list("org_1", &ListSubscriptionsParams::default())
        .await
        .expect("list still cached");
    assert_eq!(list.items[0], updated);
    assert_eq!(list.items[1].id, "s2");
    assert_eq!(list.items[1].status, SubscriptionStatus::Active);
    assert_eq!(
        list.pagination,
        Pagination {
            total_count: 2,
            max_page: 1
        }
    );

    assert_eq!(api.calls("list_subscriptions"), list_calls);
    assert_eq!(api.calls("get_subscription"), get_calls);
}

#[tokio::test]
async fn test_cancel_scenario_single_item_list() {
    let api = Arc::new(
        FakeCommerceApi::new()
            .with_subscription(subscription("s1", "org_1", SubscriptionStatus::Active)),
    );
    let client = client(Arc::clone(&api));
    let service = &client.subscriptions;

    service
        .list("org_1", &ListSubscriptionsParams::default())
        .await
        .expect("list loads");

    service
        .update("s1", SubscriptionUpdate::revoke(None, None))
        .await
        .expect("update succeeds");

    let key = SubscriptionService::<FakeCommerceApi>::list_key("org_1", &ListSubscriptionsParams::default());
    let list = service
        .cache()
        .get_data(&key)
        .await
        .and_then(QueryData::into_list)
        .expect("list cached");
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].status, SubscriptionStatus::Canceled);
    assert_eq!(list.pagination, Pagination::single_page_of_one());
}

#[tokio::test]
async fn test_filtered_list_is_patched() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));
    let service = &client.subscriptions;

    let params = ListSubscriptionsParams {
        status: Some(SubscriptionStatus::Active),
        ..ListSubscriptionsParams::default()
    };
    service.list("org_1", &params).await.expect("list loads");

    let updated = service
        .update("s2", SubscriptionUpdate::cancel_at_period_end(None, None))
        .await
        .expect("update succeeds");

    let key = SubscriptionService::<FakeCommerceApi>::list_key("org_1", &params);
    let list = service
        .cache()
        .get_data(&key)
        .await
        .and_then(QueryData::into_list)
        .expect("list cached");
    assert_eq!(list.items[1], updated);
    assert!(list.items[1].cancel_at_period_end);
}

#[tokio::test]
async fn test_missing_list_is_not_created() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));
    let service = &client.subscriptions;

    // Only org_1's list is cached
    service
        .list("org_1", &ListSubscriptionsParams::default())
        .await
        .expect("list loads");

    service
        .update("s9", SubscriptionUpdate::revoke(None, None))
        .await
        .expect("update succeeds");

    let org_2_lists = service
        .cache()
        .snapshot()
        .await
        .into_keys()
        .filter(|key| key.matches(&QueryKey::list(ResourceKind::Subscriptions, "org_2")))
        .count();
    assert_eq!(org_2_lists, 0);

    // org_1's list is untouched
    let list = service
        .list("org_1", &ListSubscriptionsParams::default())
        .await
        .expect("list cached");
    assert!(list.items.iter().all(|s| s.status == SubscriptionStatus::Active));
}

#[tokio::test]
async fn test_product_change_moves_single_entry() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));
    let service = &client.subscriptions;

    service.get("s1").await.expect("single loads");
    let updated = service
        .update("s1", SubscriptionUpdate::change_product("prod_pro"))
        .await
        .expect("update succeeds");
    assert_eq!(updated.product.id, "prod_pro");

    let cached = service.get("s1").await.expect("single cached");
    assert_eq!(cached.product.id, "prod_pro");
    assert_eq!(api.calls("get_subscription"), 1);
}

#[tokio::test]
async fn test_failed_update_leaves_cache_unchanged() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));
    let service = &client.subscriptions;

    service
        .list("org_1", &ListSubscriptionsParams::default())
        .await
        .expect("list loads");
    service.get("s1").await.expect("single loads");
    let before = service.cache().snapshot().await;

    let error = DomainError::Api {
        status: 422,
        body: "{\"detail\":\"already canceled\"}".to_string(),
    };
    api.fail_next("update_subscription", error.clone());

    let result = service
        .update("s1", SubscriptionUpdate::revoke(None, None))
        .await;
    assert_eq!(result, Err(error));

    let after = service.cache().snapshot().await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_failed_update_is_not_retried() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));

    api.fail_next(
        "update_subscription",
        DomainError::Api {
            status: 503,
            body: String::new(),
        },
    );

    let result = client
        .subscriptions
        .update("s1", SubscriptionUpdate::revoke(None, None))
        .await;
    assert!(matches!(result, Err(DomainError::Api { status: 503, .. })));
    assert_eq!(api.calls("update_subscription"), 1);
}

#[tokio::test]
async fn test_invalid_update_rejected_before_request() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));

    let result = client
        .subscriptions
        .update("s1", SubscriptionUpdate::change_product("  "))
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert_eq!(api.calls("update_subscription"), 0);
}

#[tokio::test]
async fn test_dropped_caller_still_writes_through() {
    let api = seeded_api();
    api.delay_updates(Duration::from_millis(50));
    let client = client(Arc::clone(&api));
    let service = client.subscriptions.clone();

    service.get("s1").await.expect("single loads");

    // The caller gives up long before the server answers
    let abandoned = tokio::time::timeout(
        Duration::from_millis(5),
        service.update("s1", SubscriptionUpdate::revoke(None, None)),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(200)).await;

    let cached = service
        .cache()
        .get_data(&QueryKey::single(ResourceKind::Subscriptions, "s1"))
        .await
        .and_then(QueryData::into_single)
        .expect("single cached");
    assert_eq!(cached.status, SubscriptionStatus::Canceled);
}

#[tokio::test]
async fn test_events_published_after_all_entries_written() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));
    let service = client.subscriptions.clone();

    service
        .list("org_1", &ListSubscriptionsParams::default())
        .await
        .expect("list loads");
    service.get("s1").await.expect("single loads");

    let mut events = service.cache().subscribe();
    let cache = service.cache().clone();

    service
        .update("s1", SubscriptionUpdate::revoke(None, None))
        .await
        .expect("update succeeds");

    let mut updated = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CacheEvent::Updated(key) = event {
            // Every entry is already consistent when the first event arrives
            let single = cache
                .get_data(&QueryKey::single(ResourceKind::Subscriptions, "s1"))
                .await
                .and_then(QueryData::into_single)
                .expect("single cached");
            assert_eq!(single.status, SubscriptionStatus::Canceled);
            updated.push(key);
        }
    }
    assert_eq!(updated.len(), 2);
}

#[tokio::test]
async fn test_same_result_applied_twice_is_idempotent() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));
    let service = &client.subscriptions;

    service
        .list("org_1", &ListSubscriptionsParams::default())
        .await
        .expect("list loads");
    let updated = service
        .update("s1", SubscriptionUpdate::revoke(None, None))
        .await
        .expect("update succeeds");

    let once = service.cache().snapshot().await;
    service.cache().apply_mutation_result(&updated).await;
    let twice = service.cache().snapshot().await;

    let data = |state: &storefront_cache::services::CacheState<_>| {
        state
            .iter()
            .map(|(key, entry)| (key.clone(), entry.data.clone()))
            .collect::<std::collections::HashMap<_, _>>()
    };
    assert_eq!(data(&once), data(&twice));
}

#[tokio::test]
async fn test_seed_does_not_overwrite_cached_data() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));
    let service = &client.subscriptions;

    let fetched = service.get("s1").await.expect("single loads");

    let mut stale_copy = fetched.clone();
    stale_copy.status = SubscriptionStatus::PastDue;
    service.seed(stale_copy).await;

    let cached = service.get("s1").await.expect("single cached");
    assert_eq!(cached, fetched);
}

#[tokio::test]
async fn test_seed_serves_without_fetch() {
    let api = seeded_api();
    let client = client(Arc::clone(&api));
    let service = &client.subscriptions;

    service
        .seed(subscription("s1", "org_1", SubscriptionStatus::Trialing))
        .await;

    let cached = service.get("s1").await.expect("seeded data served");
    assert_eq!(cached.status, SubscriptionStatus::Trialing);
    assert_eq!(api.calls("get_subscription"), 0);
}
