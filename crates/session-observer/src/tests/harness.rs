//! Test harness for session observer scenarios.
//!
//! Provides:
//! - GatedRoleStore: a role store whose lookups can be held per user
//! - ScriptedProvider: an identity provider that only notifies when told to
//! - TestHarness: an observer wired to an in-memory provider and a gated store

use crate::{Session, SessionObserver};
use async_trait::async_trait;
use identity_provider::{
    AuthError, AuthResult, AuthStateHub, AuthStateSubscription, IdentityProvider,
    InMemoryIdentityProvider, SocialProvider,
};
use member_types::{Identity, RoleTag};
use parking_lot::Mutex;
use role_store::{InMemoryRoleStore, RoleStore, RoleStoreResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;

pub const WAIT: Duration = Duration::from_secs(2);

/// Role store whose lookups can be held until released.
#[derive(Default)]
pub struct GatedRoleStore {
    data: InMemoryRoleStore,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
}

impl GatedRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, user_id: &str, role: RoleTag) -> Self {
        self.data = self.data.with_role(user_id, role);
        self
    }

    /// Hold lookups for `user_id` until [`release`](Self::release).
    pub fn gate(&self, user_id: &str) {
        self.gates
            .lock()
            .insert(user_id.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// Let one held lookup for `user_id` through.
    pub fn release(&self, user_id: &str) {
        if let Some(gate) = self.gates.lock().get(user_id) {
            gate.add_permits(1);
        }
    }

    pub fn fail_lookups_for(&self, user_id: &str) {
        self.data.fail_lookups_for(user_id);
    }

    pub fn stored_role(&self, user_id: &str) -> Option<RoleTag> {
        self.data.stored_role(user_id)
    }

    pub fn lookup_count(&self) -> usize {
        self.started.lock().len()
    }

    pub fn lookups_started(&self) -> Vec<String> {
        self.started.lock().clone()
    }

    /// Wait until `count` lookups for `user_id` have begun.
    pub async fn wait_started(&self, user_id: &str, count: usize) {
        wait_until(|| self.started.lock().iter().filter(|u| *u == user_id).count() >= count)
            .await;
    }

    /// Wait until `count` lookups for `user_id` have returned.
    pub async fn wait_finished(&self, user_id: &str, count: usize) {
        wait_until(|| self.finished.lock().iter().filter(|u| *u == user_id).count() >= count)
            .await;
    }
}

#[async_trait]
impl RoleStore for GatedRoleStore {
    async fn get_role(&self, user_id: &str) -> RoleStoreResult<Option<RoleTag>> {
        self.started.lock().push(user_id.to_string());
        let gate = self.gates.lock().get(user_id).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        let result = self.data.get_role(user_id).await;
        self.finished.lock().push(user_id.to_string());
        result
    }

    async fn set_role(&self, user_id: &str, role: RoleTag) -> RoleStoreResult<()> {
        self.data.set_role(user_id, role).await
    }
}

/// Provider that records calls and notifies only through [`emit`](Self::emit).
pub struct ScriptedProvider {
    hub: AuthStateHub,
    pub sign_out_calls: Mutex<usize>,
}

impl ScriptedProvider {
    pub fn new(initial: Option<Identity>) -> Self {
        Self {
            hub: AuthStateHub::new(initial),
            sign_out_calls: Mutex::new(0),
        }
    }

    pub fn emit(&self, identity: Option<Identity>) {
        self.hub.publish(identity);
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    fn subscribe(&self) -> AuthStateSubscription {
        self.hub.subscribe()
    }

    fn current_identity(&self) -> Option<Identity> {
        self.hub.current()
    }

    async fn access_token(&self) -> Option<String> {
        None
    }

    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> AuthResult<Identity> {
        Err(AuthError::InvalidCredentials)
    }

    async fn sign_in_with_social(&self, _provider: SocialProvider) -> AuthResult<Identity> {
        Err(AuthError::OAuth("not scripted".to_string()))
    }

    async fn create_account(
        &self,
        _email: &str,
        _password: &str,
        _display_name: Option<&str>,
    ) -> AuthResult<Identity> {
        Err(AuthError::Config("not scripted".to_string()))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        *self.sign_out_calls.lock() += 1;
        Ok(())
    }
}

/// Observer wired to an in-memory provider and a gated role store.
pub struct TestHarness {
    pub provider: Arc<InMemoryIdentityProvider>,
    pub store: Arc<GatedRoleStore>,
    pub observer: SessionObserver,
}

impl TestHarness {
    /// Harness with the observer not yet subscribed.
    pub fn new(store: GatedRoleStore) -> Self {
        let provider = Arc::new(
            InMemoryIdentityProvider::new().with_account(
                Identity::new("u1")
                    .with_email("ada@example.com")
                    .with_display_name("Ada"),
                "ada@example.com",
                "secret-pass",
            ),
        );
        let store = Arc::new(store);
        let observer = SessionObserver::new(provider.clone(), store.clone());
        Self {
            provider,
            store,
            observer,
        }
    }

    /// Harness with the observer subscribed and the initial (signed-out)
    /// state settled.
    pub async fn started(store: GatedRoleStore) -> Self {
        let harness = Self::new(store);
        harness.observer.init().unwrap();
        harness.settle().await;
        harness
    }

    pub async fn settle(&self) -> Session {
        timeout(WAIT, self.observer.wait_until_settled())
            .await
            .expect("session did not settle")
            .unwrap()
    }

    /// Wait for a published session matching `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&Session) -> bool) -> Session {
        wait_for_session(&self.observer, predicate).await
    }
}

pub async fn wait_for_session(
    observer: &SessionObserver,
    predicate: impl FnMut(&Session) -> bool,
) -> Session {
    let mut receiver = observer.subscribe_session();
    let session = timeout(WAIT, receiver.wait_for(predicate))
        .await
        .expect("timed out waiting for session")
        .expect("session channel closed");
    session.clone()
}

/// Poll `condition` until it holds or [`WAIT`] elapses.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached");
}

/// Give spawned tasks a chance to run.
pub async fn let_tasks_run() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}

pub fn user(id: &str) -> Identity {
    Identity::new(id)
}
