//! init/dispose behavior.

use super::harness::{let_tasks_run, user, wait_until, GatedRoleStore, TestHarness, WAIT};
use crate::{ObserverError, Session, SessionObserver};
use identity_provider::InMemoryIdentityProvider;
use member_types::RoleTag;
use role_store::InMemoryRoleStore;
use std::sync::Arc;

#[tokio::test]
async fn dispose_without_init_is_safe() {
    let harness = TestHarness::new(GatedRoleStore::new());
    harness.observer.dispose();
    harness.observer.dispose();

    harness.provider.emit(Some(user("u1")));
    let_tasks_run().await;

    assert_eq!(harness.observer.session(), Session::initial());
    assert_eq!(harness.store.lookup_count(), 0);
}

#[tokio::test]
async fn dispose_before_any_notification_stops_updates() {
    let harness = TestHarness::new(GatedRoleStore::new());
    harness.observer.init().unwrap();
    harness.observer.dispose();

    harness.provider.emit(Some(user("u1")));
    let_tasks_run().await;

    let session = harness.observer.session();
    assert!(session.user.is_none());
    assert_eq!(harness.store.lookup_count(), 0);
}

#[tokio::test]
async fn init_twice_is_rejected() {
    let harness = TestHarness::started(GatedRoleStore::new()).await;
    assert!(matches!(
        harness.observer.init(),
        Err(ObserverError::AlreadySubscribed)
    ));
}

#[tokio::test]
async fn init_after_dispose_is_rejected() {
    let harness = TestHarness::new(GatedRoleStore::new());
    harness.observer.dispose();
    assert!(matches!(
        harness.observer.init(),
        Err(ObserverError::Disposed)
    ));
    assert!(matches!(
        harness.observer.wait_until_settled().await,
        Err(ObserverError::Disposed)
    ));
}

#[tokio::test]
async fn dispose_drops_in_flight_lookup() {
    let store = GatedRoleStore::new().with_role("u1", RoleTag::College);
    store.gate("u1");
    let harness = TestHarness::started(store).await;

    harness.provider.emit(Some(user("u1")));
    harness.store.wait_started("u1", 1).await;
    let before = harness.observer.session();
    assert!(before.loading);

    harness.observer.dispose();
    harness.store.release("u1");
    harness.store.wait_finished("u1", 1).await;
    let_tasks_run().await;

    assert_eq!(harness.observer.session(), before);
}

#[tokio::test]
async fn dispose_wakes_pending_settle_wait() {
    let store = GatedRoleStore::new().with_role("u1", RoleTag::College);
    store.gate("u1");
    let harness = TestHarness::started(store).await;

    harness.provider.emit(Some(user("u1")));
    harness.store.wait_started("u1", 1).await;
    assert!(harness.observer.is_loading());

    let waiting = harness.observer.wait_until_settled();
    let disposing = async {
        let_tasks_run().await;
        harness.observer.dispose();
    };
    let (result, ()) = tokio::time::timeout(WAIT, async { tokio::join!(waiting, disposing) })
        .await
        .expect("settle wait still pending after dispose");

    assert!(matches!(result, Err(ObserverError::Disposed)));
    harness.store.release("u1");
}

#[tokio::test]
async fn dispose_releases_provider_subscription() {
    let harness = TestHarness::started(GatedRoleStore::new()).await;
    assert_eq!(harness.provider.subscriber_count(), 1);

    harness.observer.dispose();
    wait_until(|| harness.provider.subscriber_count() == 0).await;
}

#[tokio::test]
async fn dropping_observer_unsubscribes() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let observer = SessionObserver::new(provider.clone(), Arc::new(InMemoryRoleStore::new()));
    observer.init().unwrap();
    assert_eq!(provider.subscriber_count(), 1);

    drop(observer);
    wait_until(|| provider.subscriber_count() == 0).await;
}

#[tokio::test]
async fn provider_state_at_init_is_delivered_first() {
    let provider = Arc::new(InMemoryIdentityProvider::new());
    provider.emit(Some(user("u7")));
    let store = Arc::new(InMemoryRoleStore::new().with_role("u7", RoleTag::Professional));
    let observer = SessionObserver::new(provider, store);

    observer.init().unwrap();
    let session = observer.wait_until_settled().await.unwrap();

    assert_eq!(session.user_id(), Some("u7"));
    assert_eq!(session.role, Some(RoleTag::Professional));
}
