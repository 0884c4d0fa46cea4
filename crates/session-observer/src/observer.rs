//! The session observer.
//!
//! Follows the identity provider's auth-state stream and republishes a
//! [`Session`] for views. Each notification takes the next sequence number
//! inside the watch lock; a role fetch may publish only while its sequence
//! is still the latest, so an older fetch that resolves late is dropped.

use crate::{AccessDecision, MemberProfile, ObserverError, ObserverResult, RoleResolution, Session};
use identity_provider::{IdentityProvider, SocialProvider};
use member_types::{Identity, RoleTag};
use parking_lot::Mutex;
use role_store::RoleStore;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Sign-up form input.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: Option<String>,
    pub role: RoleTag,
}

struct ObserverInner {
    provider: Arc<dyn IdentityProvider>,
    role_store: Arc<dyn RoleStore>,
    sender: watch::Sender<Session>,
    sequence: AtomicU64,
    disposed: AtomicBool,
}

impl ObserverInner {
    /// Replace the session with `build(next_sequence)`. `None` once disposed.
    fn publish_next(&self, build: impl FnOnce(u64) -> Session) -> Option<u64> {
        let mut taken = None;
        self.sender.send_if_modified(|session| {
            if self.disposed.load(Ordering::SeqCst) {
                return false;
            }
            let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            *session = build(sequence);
            taken = Some(sequence);
            true
        });
        taken
    }

    /// Publish `session` only if `sequence` is still the latest.
    fn publish_if_current(&self, sequence: u64, session: Session) -> bool {
        self.sender.send_if_modified(|current| {
            if self.sequence.load(Ordering::SeqCst) != sequence {
                return false;
            }
            *current = session;
            true
        })
    }

    /// Mark disposed and invalidate anything in flight. The session value is
    /// left as is; receivers are woken so waiters can observe the disposal.
    fn shut_down(&self) {
        self.sender.send_if_modified(|_| {
            self.disposed.store(true, Ordering::SeqCst);
            self.sequence.fetch_add(1, Ordering::SeqCst);
            true
        });
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn on_notification(self: &Arc<Self>, identity: Option<Identity>) {
        match identity {
            Some(identity) => {
                let user_id = identity.id.clone();
                let Some(sequence) =
                    self.publish_next(|seq| Session::resolving(identity.clone(), seq))
                else {
                    return;
                };
                debug!(user_id = %user_id, sequence, "signed in; resolving role");

                let inner = Arc::clone(self);
                tokio::spawn(async move {
                    let (role, resolution) = inner.resolve_role(&identity.id).await;
                    let session = Session::populated(identity, role, resolution, sequence);
                    if !inner.publish_if_current(sequence, session) {
                        debug!(user_id = %user_id, sequence, "discarding stale role lookup");
                    }
                });
            }
            None => {
                if let Some(sequence) = self.publish_next(Session::empty) {
                    debug!(sequence, "signed out");
                }
            }
        }
    }

    async fn resolve_role(&self, user_id: &str) -> (RoleTag, RoleResolution) {
        match self.role_store.get_role(user_id).await {
            Ok(Some(role)) => (role, RoleResolution::Stored),
            Ok(None) => (RoleTag::default(), RoleResolution::DefaultedNotFound),
            Err(e) => {
                warn!(user_id, error = %e, "role lookup failed; using default role");
                (
                    RoleTag::default(),
                    RoleResolution::DefaultedAfterError {
                        message: e.to_string(),
                    },
                )
            }
        }
    }

    /// Show `role` as stored for `user_id` if that user is still signed in.
    fn republish_role(&self, user_id: &str, role: RoleTag) -> bool {
        self.sender.send_if_modified(|session| {
            if self.disposed.load(Ordering::SeqCst) {
                return false;
            }
            let Some(user) = session.user.clone().filter(|u| u.id == user_id) else {
                return false;
            };
            let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            *session = Session::populated(user, role, RoleResolution::Stored, sequence);
            true
        })
    }
}

/// Session state owned by the application root.
///
/// Call [`init`](Self::init) once at startup and [`dispose`](Self::dispose)
/// (or drop the observer) at shutdown.
pub struct SessionObserver {
    inner: Arc<ObserverInner>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl SessionObserver {
    pub fn new(provider: Arc<dyn IdentityProvider>, role_store: Arc<dyn RoleStore>) -> Self {
        let (sender, _) = watch::channel(Session::initial());
        Self {
            inner: Arc::new(ObserverInner {
                provider,
                role_store,
                sender,
                sequence: AtomicU64::new(0),
                disposed: AtomicBool::new(false),
            }),
            pump: Mutex::new(None),
        }
    }

    /// Subscribe to the provider and start following auth-state changes.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn init(&self) -> ObserverResult<()> {
        let mut pump = self.pump.lock();
        if self.inner.disposed.load(Ordering::SeqCst) {
            return Err(ObserverError::Disposed);
        }
        if pump.is_some() {
            return Err(ObserverError::AlreadySubscribed);
        }

        let mut subscription = self.inner.provider.subscribe();
        let inner = Arc::clone(&self.inner);
        *pump = Some(tokio::spawn(async move {
            while let Some(identity) = subscription.next().await {
                inner.on_notification(identity);
            }
            debug!("auth state stream ended");
        }));

        info!("session observer subscribed");
        Ok(())
    }

    /// Stop following the provider. No session update is published after
    /// this returns. Safe to call repeatedly or without `init`.
    pub fn dispose(&self) {
        let handle = {
            let mut pump = self.pump.lock();
            if self.inner.disposed.load(Ordering::SeqCst) {
                return;
            }
            self.inner.shut_down();
            pump.take()
        };

        if let Some(handle) = handle {
            handle.abort();
            info!("session observer unsubscribed");
        }
    }

    pub fn session(&self) -> Session {
        self.inner.sender.borrow().clone()
    }

    /// Receiver that sees every published session.
    pub fn subscribe_session(&self) -> watch::Receiver<Session> {
        self.inner.sender.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.sender.borrow().user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.sender.borrow().loading
    }

    pub fn role(&self) -> Option<RoleTag> {
        self.inner.sender.borrow().role
    }

    pub fn member_profile(&self) -> Option<MemberProfile> {
        MemberProfile::from_session(&self.inner.sender.borrow())
    }

    pub fn access(&self) -> AccessDecision {
        AccessDecision::from(&*self.inner.sender.borrow())
    }

    /// Wait until the session is no longer loading.
    ///
    /// Fails with `Disposed` once the observer is disposed, including when
    /// that happens while waiting.
    pub async fn wait_until_settled(&self) -> ObserverResult<Session> {
        let mut receiver = self.inner.sender.subscribe();
        let session = receiver
            .wait_for(|session| !session.loading || self.inner.is_disposed())
            .await
            .map_err(|_| ObserverError::Disposed)?
            .clone();
        if self.inner.is_disposed() {
            return Err(ObserverError::Disposed);
        }
        Ok(session)
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> ObserverResult<Identity> {
        Ok(self
            .inner
            .provider
            .sign_in_with_password(email, password)
            .await?)
    }

    pub async fn sign_in_with_social(&self, provider: SocialProvider) -> ObserverResult<Identity> {
        Ok(self.inner.provider.sign_in_with_social(provider).await?)
    }

    /// Create an account and save the chosen role for it.
    pub async fn create_account(&self, account: &NewAccount) -> ObserverResult<Identity> {
        if account.password != account.confirm_password {
            return Err(ObserverError::PasswordMismatch);
        }

        let identity = self
            .inner
            .provider
            .create_account(
                &account.email,
                &account.password,
                account.display_name.as_deref(),
            )
            .await?;

        self.inner
            .role_store
            .set_role(&identity.id, account.role)
            .await?;
        self.inner.republish_role(&identity.id, account.role);
        info!(user_id = %identity.id, role = %account.role, "member registered");
        Ok(identity)
    }

    /// Save a new role for the signed-in member and publish it.
    pub async fn update_role(&self, role: RoleTag) -> ObserverResult<Session> {
        let user_id = self
            .session()
            .user
            .map(|u| u.id)
            .ok_or(ObserverError::NotSignedIn)?;

        self.inner.role_store.set_role(&user_id, role).await?;
        self.inner.republish_role(&user_id, role);
        info!(user_id = %user_id, role = %role, "role updated");
        Ok(self.session())
    }

    /// Ask the provider to sign out. The session is cleared when the
    /// provider's sign-out notification arrives.
    pub async fn sign_out(&self) -> ObserverResult<()> {
        self.inner.provider.sign_out().await?;
        Ok(())
    }
}

impl Drop for SessionObserver {
    fn drop(&mut self) {
        self.dispose();
    }
}
