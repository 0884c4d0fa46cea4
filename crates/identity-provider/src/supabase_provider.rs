//! Supabase-backed identity provider.

use crate::gotrue_client::{GoTrueClient, TokenResponse};
use crate::oauth::OAuthCallbackServer;
use crate::persistence::{PersistedSession, SessionFile};
use crate::pkce::PkcePair;
use crate::{
    AuthError, AuthResult, AuthStateHub, AuthStateSubscription, IdentityProvider, SocialProvider,
    DEFAULT_OAUTH_PORT, DEFAULT_OAUTH_TIMEOUT_SECS,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use member_types::Identity;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Opens a URL in the user's browser.
pub type BrowserOpener = Arc<dyn Fn(&str) -> std::io::Result<()> + Send + Sync>;

/// Identity provider talking to Supabase Auth.
///
/// The signed-in session is kept in memory and mirrored to a [`SessionFile`]
/// so [`restore`](Self::restore) can pick it up on the next start.
pub struct SupabaseIdentityProvider {
    client: GoTrueClient,
    session_file: SessionFile,
    hub: AuthStateHub,
    session: Mutex<Option<PersistedSession>>,
    callback_port: u16,
    callback_timeout_secs: u64,
    browser: BrowserOpener,
}

impl SupabaseIdentityProvider {
    pub fn new(client: GoTrueClient, session_file: SessionFile) -> Self {
        Self {
            client,
            session_file,
            hub: AuthStateHub::new(None),
            session: Mutex::new(None),
            callback_port: DEFAULT_OAUTH_PORT,
            callback_timeout_secs: DEFAULT_OAUTH_TIMEOUT_SECS,
            browser: Arc::new(|url: &str| {
                info!(url, "open this URL in a browser to continue");
                Ok(())
            }),
        }
    }

    /// Callback port and redirect timeout for social sign-in.
    pub fn with_oauth(mut self, port: u16, timeout_secs: u64) -> Self {
        self.callback_port = port;
        self.callback_timeout_secs = timeout_secs;
        self
    }

    pub fn with_browser_opener(mut self, browser: BrowserOpener) -> Self {
        self.browser = browser;
        self
    }

    /// Load the persisted session, refreshing it if the access token has
    /// expired. Publishes the restored identity.
    ///
    /// A refresh the service rejects clears the stored session. Transport
    /// errors are returned and leave the file in place.
    pub async fn restore(&self) -> AuthResult<Option<Identity>> {
        let mut guard = self.session.lock().await;
        let Some(stored) = self.session_file.load()? else {
            return Ok(None);
        };

        let session = if stored.is_expired() {
            match self.client.refresh(&stored.refresh_token).await {
                Ok(tokens) => self.persist(tokens)?,
                Err(err @ AuthError::Rejected { .. }) => {
                    warn!(error = %err, "stored session could not be refreshed; signing out");
                    self.session_file.clear()?;
                    return Ok(None);
                }
                Err(err) => return Err(err),
            }
        } else {
            stored
        };

        let identity = session.user.clone();
        info!(user_id = %identity.id, "restored session");
        *guard = Some(session);
        self.hub.publish(Some(identity.clone()));
        Ok(Some(identity))
    }

    /// Adopt whatever another process last wrote to the session file.
    ///
    /// A different user, a sign-in or a sign-out is published and returns
    /// `true`. Rotated tokens for the same user are taken over silently.
    /// Expired tokens are left for [`access_token`](IdentityProvider::access_token)
    /// to refresh.
    pub async fn sync_from_file(&self) -> AuthResult<bool> {
        let mut guard = self.session.lock().await;
        let on_disk = self.session_file.load()?;
        if *guard == on_disk {
            return Ok(false);
        }

        let user_changed =
            guard.as_ref().map(|s| &s.user.id) != on_disk.as_ref().map(|s| &s.user.id);
        let identity = on_disk.as_ref().map(|s| s.user.clone());
        *guard = on_disk;
        if !user_changed {
            debug!("adopted tokens written by another process");
            return Ok(false);
        }

        info!(user_id = ?identity.as_ref().map(|i| &i.id), "session file changed");
        self.hub.publish(identity);
        Ok(true)
    }

    /// Poll the session file every `every` so sign-ins and sign-outs made
    /// by other processes reach this provider's subscribers. The task ends
    /// once the provider is dropped.
    pub fn watch_session_file(self: &Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        let provider = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(provider) = provider.upgrade() else {
                    break;
                };
                if let Err(e) = provider.sync_from_file().await {
                    warn!(error = %e, "failed to read session file");
                }
            }
        })
    }

    fn persist(&self, tokens: TokenResponse) -> AuthResult<PersistedSession> {
        let session = PersistedSession {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
            user: tokens.user.into_identity(),
        };
        self.session_file.save(&session)?;
        Ok(session)
    }

    /// Store a fresh grant and announce the identity.
    async fn establish(&self, tokens: TokenResponse) -> AuthResult<Identity> {
        let mut guard = self.session.lock().await;
        let session = self.persist(tokens)?;
        let identity = session.user.clone();
        *guard = Some(session);
        self.hub.publish(Some(identity.clone()));
        Ok(identity)
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    fn subscribe(&self) -> AuthStateSubscription {
        self.hub.subscribe()
    }

    fn current_identity(&self) -> Option<Identity> {
        self.hub.current()
    }

    async fn access_token(&self) -> Option<String> {
        let mut guard = self.session.lock().await;
        let session = guard.as_ref()?;
        if !session.is_expired() {
            return Some(session.access_token.clone());
        }

        match self.client.refresh(&session.refresh_token).await {
            Ok(tokens) => match self.persist(tokens) {
                Ok(refreshed) => {
                    let token = refreshed.access_token.clone();
                    *guard = Some(refreshed);
                    Some(token)
                }
                Err(e) => {
                    warn!(error = %e, "failed to store refreshed session");
                    None
                }
            },
            Err(err @ AuthError::Rejected { .. }) => {
                warn!(error = %err, "session refresh rejected; signing out");
                *guard = None;
                if let Err(e) = self.session_file.clear() {
                    warn!(error = %e, "failed to clear session file");
                }
                self.hub.publish(None);
                None
            }
            Err(err) => {
                warn!(error = %err, "session refresh failed");
                None
            }
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let tokens = self.client.sign_in_with_password(email, password).await?;
        let identity = self.establish(tokens).await?;
        info!(user_id = %identity.id, "signed in with password");
        Ok(identity)
    }

    async fn sign_in_with_social(&self, provider: SocialProvider) -> AuthResult<Identity> {
        let pending = OAuthCallbackServer::new(self.callback_port, self.callback_timeout_secs)
            .listen()
            .await?;
        let pkce = PkcePair::generate();
        let url = self
            .client
            .authorize_url(provider, &pending.callback_url(), &pkce)?;

        (self.browser)(&url)
            .map_err(|e| AuthError::OAuth(format!("failed to open browser: {}", e)))?;

        let code = pending.wait_for_code().await?;
        let tokens = self.client.exchange_code(&code, &pkce.verifier).await?;
        let identity = self.establish(tokens).await?;
        info!(user_id = %identity.id, provider = %provider, "signed in with social provider");
        Ok(identity)
    }

    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> AuthResult<Identity> {
        let tokens = self.client.sign_up(email, password, display_name).await?;
        let identity = self.establish(tokens).await?;
        info!(user_id = %identity.id, "account created");
        Ok(identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.take() {
            if let Err(e) = self.client.logout(&session.access_token).await {
                warn!(error = %e, "remote sign-out failed; clearing local session anyway");
            }
        }
        self.session_file.clear()?;
        self.hub.publish(None);
        info!("signed out");
        Ok(())
    }
}
