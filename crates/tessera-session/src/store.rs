//! Session Store
//!
//! Holds the current user, mirrors it to a durable slot on every change and
//! restores it from that slot once at startup.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use tessera_auth::{AuthApi, Credentials, NewUser, ProfileUpdate, UserId, UserRecord};
use tessera_storage::KeyValueStore;

use crate::error::SessionError;
use crate::options::SessionOptions;
use crate::outcome::EditOutcome;
use crate::Result;

/// Shared current-user state.
///
/// Clones share everything, so a single store can be handed to every
/// consumer that needs to read the user or trigger an operation.
pub struct SessionStore {
    /// Logged-in user, normalized
    current: Arc<RwLock<Option<UserRecord>>>,
    /// Bumped by logout; results from an older epoch are dropped
    epoch: Arc<AtomicU64>,
    /// Set once the durable slot has been read
    hydrated: Arc<AtomicBool>,
    /// Change broadcast for subscribers
    notifier: Arc<watch::Sender<Option<UserRecord>>>,
    api: Arc<dyn AuthApi>,
    slots: Arc<dyn KeyValueStore>,
    options: Arc<SessionOptions>,
}

impl SessionStore {
    pub fn new(
        api: Arc<dyn AuthApi>,
        slots: Arc<dyn KeyValueStore>,
        options: SessionOptions,
    ) -> Self {
        let (notifier, _) = watch::channel(None);

        Self {
            current: Arc::new(RwLock::new(None)),
            epoch: Arc::new(AtomicU64::new(0)),
            hydrated: Arc::new(AtomicBool::new(false)),
            notifier: Arc::new(notifier),
            api,
            slots,
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<UserRecord> {
        self.current.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.read().is_some()
    }

    /// Receive every change to the current user, starting from the present value.
    pub fn subscribe(&self) -> watch::Receiver<Option<UserRecord>> {
        self.notifier.subscribe()
    }

    /// Restore the session from the durable slot.
    ///
    /// Only the first call reads storage; later calls return the current
    /// user. A slot that does not parse is removed and treated as no session.
    /// If a user was committed before hydration ran, that user is kept.
    pub fn hydrate(&self) -> Result<Option<UserRecord>> {
        if self.hydrated.swap(true, Ordering::SeqCst) {
            return Ok(self.current_user());
        }

        let mut current = self.current.write();
        if let Some(user) = current.as_ref() {
            tracing::debug!(user_id = %user.id, "Session already active, skipping hydration");
            return Ok(Some(user.clone()));
        }

        let key = self.options.storage_key.as_str();
        let raw = match self.slots.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                // Allow the caller to retry once storage is reachable
                self.hydrated.store(false, Ordering::SeqCst);
                return Err(e.into());
            }
        };

        let Some(raw) = raw else {
            tracing::debug!(key = %key, "No stored session");
            return Ok(None);
        };

        let user = match serde_json::from_str::<UserRecord>(&raw) {
            Ok(user) => user.normalized(&self.options.default_avatar),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding corrupt stored session");
                if let Err(e) = self.slots.remove(key) {
                    tracing::warn!(key = %key, error = %e, "Failed to remove corrupt session");
                }
                return Ok(None);
            }
        };

        *current = Some(user.clone());
        self.notifier.send_replace(Some(user.clone()));

        tracing::info!(user_id = %user.id, "Restored session");

        Ok(Some(user))
    }

    /// Log in with `credentials`.
    ///
    /// Fails with [`SessionError::Authentication`] when no user matches; the
    /// session is left as it was.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserRecord> {
        let epoch = self.epoch();

        let user = self.api.login(credentials).await?.ok_or_else(|| {
            tracing::warn!(email = %credentials.email, "Login rejected");
            SessionError::Authentication
        })?;

        let user = self.commit(epoch, user).ok_or(SessionError::Superseded)?;

        tracing::info!(user_id = %user.id, "Logged in");

        Ok(user)
    }

    /// Register a new user and log them in.
    ///
    /// The default avatar is applied to `profile` before it is sent and again
    /// to the record the remote system returns.
    pub async fn register(&self, mut profile: NewUser) -> Result<UserRecord> {
        profile.normalize(&self.options.default_avatar);
        let epoch = self.epoch();

        let user = self
            .api
            .register(&profile)
            .await
            .map_err(SessionError::Registration)?;

        let user = self.commit(epoch, user).ok_or(SessionError::Superseded)?;

        tracing::info!(user_id = %user.id, "Registered user");

        Ok(user)
    }

    /// Update the logged-in user's profile.
    ///
    /// Does nothing when logged out. Remote failures are logged and reported
    /// through [`EditOutcome::Failed`], never as an error.
    pub async fn edit_profile(&self, updates: &ProfileUpdate) -> EditOutcome {
        let Some(id) = self.current_id() else {
            tracing::debug!("Edit ignored, no user logged in");
            return EditOutcome::SkippedLoggedOut;
        };
        let epoch = self.epoch();

        let user = match self.api.update(&id, updates).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(user_id = %id, error = %e, "Failed to update user");
                return EditOutcome::Failed(e);
            }
        };

        match self.commit(epoch, user) {
            Some(user) => {
                tracing::info!(user_id = %user.id, "Updated profile");
                EditOutcome::Updated(user)
            }
            None => EditOutcome::Superseded,
        }
    }

    /// Clear the session and its durable slot. Never fails; safe to repeat.
    pub fn logout(&self) {
        let mut current = self.current.write();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let previous = current.take();

        let key = self.options.storage_key.as_str();
        if let Err(e) = self.slots.remove(key) {
            tracing::warn!(key = %key, error = %e, "Failed to remove stored session");
        }

        self.notifier.send_replace(None);

        match previous {
            Some(user) => tracing::info!(user_id = %user.id, "Logged out"),
            None => tracing::debug!("Logout with no active session"),
        }
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn current_id(&self) -> Option<UserId> {
        self.current.read().as_ref().map(|user| user.id.clone())
    }

    /// Make `user` current if no logout happened since `epoch`.
    ///
    /// The epoch check, the in-memory swap and the slot write happen under
    /// one write lock. Returns `None` for a stale result.
    fn commit(&self, epoch: u64, user: UserRecord) -> Option<UserRecord> {
        let user = user.normalized(&self.options.default_avatar);

        let mut current = self.current.write();
        if self.epoch() != epoch {
            tracing::warn!(user_id = %user.id, "Discarding result from an ended session");
            return None;
        }

        self.persist(&user);
        *current = Some(user.clone());
        self.notifier.send_replace(Some(user.clone()));

        Some(user)
    }

    /// Best-effort mirror; a failed write leaves only the in-memory copy.
    fn persist(&self, user: &UserRecord) {
        let key = self.options.storage_key.as_str();

        let raw = match serde_json::to_string(user) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to serialize session");
                return;
            }
        };

        if let Err(e) = self.slots.set(key, &raw) {
            tracing::warn!(key = %key, error = %e, "Failed to persist session");
        }
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
            epoch: Arc::clone(&self.epoch),
            hydrated: Arc::clone(&self.hydrated),
            notifier: Arc::clone(&self.notifier),
            api: Arc::clone(&self.api),
            slots: Arc::clone(&self.slots),
            options: Arc::clone(&self.options),
        }
    }
}
