//! Sign-in, sign-up, sign-out and role updates issued through the observer.

use super::harness::{
    let_tasks_run, user, wait_for_session, GatedRoleStore, ScriptedProvider, TestHarness,
};
use crate::{AccessDecision, NewAccount, ObserverError, SessionObserver, SessionState};
use identity_provider::{AuthError, IdentityProvider};
use member_types::RoleTag;
use role_store::InMemoryRoleStore;
use std::sync::Arc;

fn new_account(email: &str, confirm: &str, role: RoleTag) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        password: "long-enough".to_string(),
        confirm_password: confirm.to_string(),
        display_name: Some("Grace".to_string()),
        role,
    }
}

#[tokio::test]
async fn password_sign_in_populates_session() {
    let harness =
        TestHarness::started(GatedRoleStore::new().with_role("u1", RoleTag::College)).await;

    let identity = harness
        .observer
        .sign_in_with_password("ada@example.com", "secret-pass")
        .await
        .unwrap();
    assert_eq!(identity.id, "u1");

    let session = harness.wait_for(|s| s.user.is_some() && !s.loading).await;
    assert_eq!(session.role, Some(RoleTag::College));
    assert!(harness.observer.is_authenticated());
    assert_eq!(harness.observer.role(), Some(RoleTag::College));

    let profile = harness.observer.member_profile().unwrap();
    assert_eq!(profile.name, "Ada");
    assert_eq!(profile.title, "College");
    assert_eq!(
        harness.observer.access(),
        AccessDecision::Allowed {
            role: RoleTag::College
        }
    );
}

#[tokio::test]
async fn wrong_password_is_surfaced_and_session_untouched() {
    let harness = TestHarness::started(GatedRoleStore::new()).await;

    let err = harness
        .observer
        .sign_in_with_password("ada@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, ObserverError::Auth(AuthError::InvalidCredentials)));
    assert_eq!(err.to_string(), "Invalid login credentials");

    let_tasks_run().await;
    assert_eq!(harness.observer.session().state(), SessionState::Empty);
    assert_eq!(harness.observer.access(), AccessDecision::SignInRequired);
}

#[tokio::test]
async fn create_account_saves_chosen_role() {
    let harness = TestHarness::started(GatedRoleStore::new()).await;

    let identity = harness
        .observer
        .create_account(&new_account("grace@example.com", "long-enough", RoleTag::Professional))
        .await
        .unwrap();

    assert_eq!(
        harness.store.stored_role(&identity.id),
        Some(RoleTag::Professional)
    );
    let session = harness
        .wait_for(|s| s.user.is_some() && s.role == Some(RoleTag::Professional))
        .await;
    assert!(!session.loading);
    assert_eq!(session.user_id(), Some(identity.id.as_str()));

    let_tasks_run().await;
    assert_eq!(harness.observer.role(), Some(RoleTag::Professional));
}

#[tokio::test]
async fn create_account_rejects_mismatched_confirmation() {
    let harness = TestHarness::started(GatedRoleStore::new()).await;

    let err = harness
        .observer
        .create_account(&new_account("grace@example.com", "different", RoleTag::College))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Passwords don't match!");
    assert!(harness.provider.current_identity().is_none());
}

#[tokio::test]
async fn create_account_surfaces_provider_error() {
    let harness = TestHarness::started(GatedRoleStore::new()).await;

    let err = harness
        .observer
        .create_account(&new_account("ada@example.com", "long-enough", RoleTag::College))
        .await
        .unwrap_err();

    assert!(matches!(err, ObserverError::Auth(AuthError::AccountExists(_))));
}

#[tokio::test]
async fn update_role_republishes_session() {
    let harness = TestHarness::started(GatedRoleStore::new()).await;
    harness
        .observer
        .sign_in_with_password("ada@example.com", "secret-pass")
        .await
        .unwrap();
    let before = harness.wait_for(|s| s.user.is_some() && !s.loading).await;
    assert_eq!(before.role, Some(RoleTag::School));

    let after = harness.observer.update_role(RoleTag::College).await.unwrap();

    assert_eq!(after.role, Some(RoleTag::College));
    assert_eq!(after.role_resolution, Some(crate::RoleResolution::Stored));
    assert!(after.sequence > before.sequence);
    assert_eq!(harness.store.stored_role("u1"), Some(RoleTag::College));
}

#[tokio::test]
async fn update_role_requires_sign_in() {
    let harness = TestHarness::started(GatedRoleStore::new()).await;
    assert!(matches!(
        harness.observer.update_role(RoleTag::College).await,
        Err(ObserverError::NotSignedIn)
    ));
}

#[tokio::test]
async fn sign_out_waits_for_provider_notification() {
    let provider = Arc::new(ScriptedProvider::new(Some(user("u1"))));
    let observer = SessionObserver::new(
        provider.clone(),
        Arc::new(InMemoryRoleStore::new().with_role("u1", RoleTag::College)),
    );
    observer.init().unwrap();
    observer.wait_until_settled().await.unwrap();

    observer.sign_out().await.unwrap();
    let_tasks_run().await;

    assert_eq!(*provider.sign_out_calls.lock(), 1);
    assert_eq!(observer.session().user_id(), Some("u1"));

    provider.emit(None);
    let session = wait_for_session(&observer, |s| s.user.is_none()).await;
    assert_eq!(session.state(), SessionState::Empty);
}

#[tokio::test]
async fn in_memory_sign_out_clears_session() {
    let harness = TestHarness::started(GatedRoleStore::new()).await;
    harness
        .observer
        .sign_in_with_password("ada@example.com", "secret-pass")
        .await
        .unwrap();
    harness.wait_for(|s| s.user.is_some() && !s.loading).await;

    harness.observer.sign_out().await.unwrap();
    let session = harness.wait_for(|s| s.user.is_none()).await;

    assert!(!session.loading);
    assert!(harness.observer.member_profile().is_none());
}
