//! In-memory identity provider.
//!
//! Keeps accounts in a local table and follows the same notification rules
//! as the Supabase implementation. Used by tests and offline runs.

use crate::{
    AuthError, AuthResult, AuthStateHub, AuthStateSubscription, IdentityProvider, SocialProvider,
};
use async_trait::async_trait;
use member_types::Identity;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Minimum password length accepted by `create_account`.
pub const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    identity: Identity,
    password: String,
}

/// Identity provider backed by an in-process account table.
pub struct InMemoryIdentityProvider {
    hub: AuthStateHub,
    accounts: Mutex<HashMap<String, Account>>,
    next_id: AtomicU64,
}

impl InMemoryIdentityProvider {
    /// Empty provider with nobody signed in.
    pub fn new() -> Self {
        Self {
            hub: AuthStateHub::new(None),
            accounts: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Seed an account without signing it in.
    pub fn with_account(self, identity: Identity, email: &str, password: &str) -> Self {
        self.accounts.lock().insert(
            normalize_email(email),
            Account {
                identity,
                password: password.to_string(),
            },
        );
        self
    }

    /// Push a raw auth-state change, as the service does when a session
    /// expires or is restored elsewhere.
    pub fn emit(&self, identity: Option<Identity>) {
        self.hub.publish(identity);
    }

    /// Number of live auth-state subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    fn allocate_id(&self) -> String {
        format!("user-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn validate_email(email: &str) -> AuthResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AuthError::InvalidEmail(email.to_string())),
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn subscribe(&self) -> AuthStateSubscription {
        self.hub.subscribe()
    }

    fn current_identity(&self) -> Option<Identity> {
        self.hub.current()
    }

    async fn access_token(&self) -> Option<String> {
        self.hub.current().map(|identity| format!("memory-{}", identity.id))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let identity = {
            let accounts = self.accounts.lock();
            match accounts.get(&normalize_email(email)) {
                Some(account) if account.password == password => account.identity.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };

        info!(user_id = %identity.id, "signed in with password");
        self.hub.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in_with_social(&self, provider: SocialProvider) -> AuthResult<Identity> {
        let key = format!("{}@{}.social", provider.as_str(), provider.as_str());
        let identity = {
            let mut accounts = self.accounts.lock();
            if let Some(account) = accounts.get(&key) {
                account.identity.clone()
            } else {
                let identity = Identity::new(self.allocate_id())
                    .with_display_name(format!("{} member", provider.as_str()));
                accounts.insert(
                    key,
                    Account {
                        identity: identity.clone(),
                        password: String::new(),
                    },
                );
                identity
            }
        };

        info!(user_id = %identity.id, provider = %provider, "signed in with social provider");
        self.hub.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AuthResult<Identity> {
        validate_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }

        let key = normalize_email(email);
        let identity = {
            let mut accounts = self.accounts.lock();
            if accounts.contains_key(&key) {
                return Err(AuthError::AccountExists(email.to_string()));
            }

            let mut identity = Identity::new(self.allocate_id()).with_email(key.clone());
            identity.display_name = display_name.map(str::to_string);
            accounts.insert(
                key,
                Account {
                    identity: identity.clone(),
                    password: password.to_string(),
                },
            );
            identity
        };

        info!(user_id = %identity.id, "account created");
        self.hub.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.hub.publish(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> InMemoryIdentityProvider {
        InMemoryIdentityProvider::new().with_account(
            Identity::new("u1").with_email("ada@example.com"),
            "ada@example.com",
            "secret-pass",
        )
    }

    #[tokio::test]
    async fn sign_in_publishes_identity() {
        let provider = provider();
        let mut sub = provider.subscribe();
        assert_eq!(sub.next().await, Some(None));

        let identity = provider
            .sign_in_with_password("ADA@example.com", "secret-pass")
            .await
            .unwrap();
        assert_eq!(identity.id, "u1");
        assert_eq!(sub.next().await, Some(Some(identity)));
        assert_eq!(provider.current_identity().unwrap().id, "u1");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_without_notification() {
        let provider = provider();

        let err = provider
            .sign_in_with_password("ada@example.com", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(provider.current_identity().is_none());
    }

    #[tokio::test]
    async fn create_account_rejects_duplicates() {
        let provider = provider();
        let err = provider
            .create_account("ada@example.com", "another-pass", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountExists(_)));
    }

    #[tokio::test]
    async fn create_account_validates_input() {
        let provider = InMemoryIdentityProvider::new();
        assert!(matches!(
            provider.create_account("not-an-email", "long-enough", None).await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            provider.create_account("bo@example.com", "short", None).await,
            Err(AuthError::WeakPassword(MIN_PASSWORD_LEN))
        ));
    }

    #[tokio::test]
    async fn create_account_signs_in() {
        let provider = InMemoryIdentityProvider::new();
        let identity = provider
            .create_account("bo@example.com", "long-enough", Some("Bo"))
            .await
            .unwrap();

        assert_eq!(identity.display_name.as_deref(), Some("Bo"));
        assert_eq!(provider.current_identity(), Some(identity.clone()));
        assert_eq!(
            provider.access_token().await,
            Some(format!("memory-{}", identity.id))
        );
    }

    #[tokio::test]
    async fn social_sign_in_reuses_identity() {
        let provider = InMemoryIdentityProvider::new();
        let first = provider
            .sign_in_with_social(SocialProvider::Google)
            .await
            .unwrap();
        provider.sign_out().await.unwrap();
        let second = provider
            .sign_in_with_social(SocialProvider::Google)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn sign_out_publishes_absent() {
        let provider = provider();
        provider
            .sign_in_with_password("ada@example.com", "secret-pass")
            .await
            .unwrap();
        let mut sub = provider.subscribe();
        assert!(matches!(sub.next().await, Some(Some(_))));

        provider.sign_out().await.unwrap();
        assert_eq!(sub.next().await, Some(None));
        assert!(provider.access_token().await.is_none());
    }
}
