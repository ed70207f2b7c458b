//! Session provider
//!
//! The single object the UI layer receives. It owns the configuration and the
//! session store; every consumer gets a clone and reads the same user.

use std::sync::Arc;
use tokio::sync::watch;

use tessera_auth::{AuthApi, Credentials, HttpAuthApi, NewUser, ProfileUpdate, UserRecord};
use tessera_session::{EditOutcome, SessionStore};
use tessera_storage::{Database, KeyValueStore};

use crate::config::Config;
use crate::Result;

#[derive(Clone)]
pub struct AuthProvider {
    config: Arc<Config>,
    session: SessionStore,
}

impl AuthProvider {
    /// Open the slot database and connect to the configured auth API.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let db = Database::open(&config.database_path)?;
        let api = HttpAuthApi::new(
            &config.api_base_url,
            &config.users_resource,
            config.request_timeout(),
        )?;

        tracing::info!(
            database = %config.database_path.display(),
            api = %api.base_url(),
            "Opened session provider"
        );

        Ok(Self::with_backends(config, Arc::new(api), Arc::new(db)))
    }

    /// Build a provider over caller-supplied backends.
    pub fn with_backends(
        config: Config,
        api: Arc<dyn AuthApi>,
        slots: Arc<dyn KeyValueStore>,
    ) -> Self {
        let session = SessionStore::new(api, slots, config.session_options());

        Self {
            config: Arc::new(config),
            session,
        }
    }

    /// Restore the previous session. Call once before the first render.
    pub fn initialize(&self) -> Result<Option<UserRecord>> {
        let user = self.session.hydrate()?;
        tracing::info!(logged_in = user.is_some(), "Session provider initialized");
        Ok(user)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // === Read surface ===

    pub fn current_user(&self) -> Option<UserRecord> {
        self.session.current_user()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserRecord>> {
        self.session.subscribe()
    }

    // === Operations ===

    pub async fn login(&self, credentials: &Credentials) -> Result<UserRecord> {
        Ok(self.session.login(credentials).await?)
    }

    pub async fn register(&self, profile: NewUser) -> Result<UserRecord> {
        Ok(self.session.register(profile).await?)
    }

    pub async fn edit_profile(&self, updates: &ProfileUpdate) -> EditOutcome {
        self.session.edit_profile(updates).await
    }

    pub fn logout(&self) {
        self.session.logout();
    }
}
