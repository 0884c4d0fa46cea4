//! Application root: owns the identity provider and the session observer
//! for the lifetime of one command.

use anyhow::{Context, Result};
use careerpath_config_and_utils::{init_logging, Config, Paths};
use identity_provider::{GoTrueClient, SessionFile, SupabaseIdentityProvider};
use role_store::SupabaseRoleStore;
use session_observer::{Session, SessionObserver};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long a command waits for the first session to settle.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(15);

/// How often `follow_session_file` rereads the stored session.
const SESSION_FILE_POLL: Duration = Duration::from_secs(1);

pub struct App {
    pub observer: SessionObserver,
    provider: Arc<SupabaseIdentityProvider>,
}

impl App {
    /// Load config, start logging, restore the stored session and
    /// subscribe the observer.
    pub async fn start(base_dir: Option<PathBuf>, log_level: Option<&str>) -> Result<Self> {
        let paths = Paths::resolve(base_dir)?;
        paths.ensure_dirs()?;

        let config = Config::load(&paths).context("failed to load configuration")?;
        init_logging(
            "cli",
            log_level.unwrap_or(&config.log_level),
            &paths,
            false,
        );
        debug!(base_dir = %paths.base_dir().display(), "starting");

        let api_url = config.supabase_base_url();
        let provider = Arc::new(
            SupabaseIdentityProvider::new(
                GoTrueClient::new(&api_url, &config.supabase_publishable_key),
                SessionFile::new(paths.session_file()),
            )
            .with_oauth(config.oauth_callback_port, config.oauth_timeout_secs)
            .with_browser_opener(Arc::new(|url: &str| open::that(url))),
        );

        if let Err(e) = provider.restore().await {
            warn!(error = %e, "could not restore stored session");
        }

        let role_store = Arc::new(SupabaseRoleStore::new(
            &api_url,
            &config.supabase_publishable_key,
            provider.clone(),
        ));
        let observer = SessionObserver::new(provider.clone(), role_store);
        observer.init()?;

        Ok(Self { observer, provider })
    }

    /// Wait for the observer to leave the loading state.
    pub async fn settled(&self) -> Result<Session> {
        let session = tokio::time::timeout(SETTLE_TIMEOUT, self.observer.wait_until_settled())
            .await
            .context("timed out resolving the member session")??;
        Ok(session)
    }

    /// Wait until the published session satisfies `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&Session) -> bool) -> Result<Session> {
        let mut receiver = self.observer.subscribe_session();
        let session = tokio::time::timeout(SETTLE_TIMEOUT, receiver.wait_for(predicate))
            .await
            .context("timed out waiting for the member session")?
            .context("session observer stopped")?
            .clone();
        Ok(session)
    }

    /// Wait for the populated session of `user_id`.
    pub async fn wait_for_member(&self, user_id: &str) -> Result<Session> {
        self.wait_for(|s| !s.loading && s.user_id() == Some(user_id))
            .await
    }

    /// Pick up sign-ins and sign-outs made by other `careerpath` processes
    /// until the returned task is aborted.
    pub fn follow_session_file(&self) -> JoinHandle<()> {
        self.provider.watch_session_file(SESSION_FILE_POLL)
    }

    pub fn shutdown(&self) {
        self.observer.dispose();
    }
}
