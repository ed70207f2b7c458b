//! Authentication API contract

use std::sync::Arc;

use async_trait::async_trait;

use crate::user::{Credentials, NewUser, ProfileUpdate, UserId, UserRecord};
use crate::Result;

/// The three remote calls the session cache depends on.
///
/// Implementations must be thread-safe (`Send + Sync`); a session store may
/// be cloned into many consumers that call it concurrently.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Look up the user matching `credentials`.
    ///
    /// Returns `Ok(None)` when no user matches. `Err` is reserved for
    /// transport or server failures.
    async fn login(&self, credentials: &Credentials) -> Result<Option<UserRecord>>;

    /// Create a user from `profile` and return the record the remote system stored.
    async fn register(&self, profile: &NewUser) -> Result<UserRecord>;

    /// Apply `updates` to the user `id` and return the full updated record.
    async fn update(&self, id: &UserId, updates: &ProfileUpdate) -> Result<UserRecord>;
}

#[async_trait]
impl<A: AuthApi + ?Sized> AuthApi for Arc<A> {
    async fn login(&self, credentials: &Credentials) -> Result<Option<UserRecord>> {
        (**self).login(credentials).await
    }

    async fn register(&self, profile: &NewUser) -> Result<UserRecord> {
        (**self).register(profile).await
    }

    async fn update(&self, id: &UserId, updates: &ProfileUpdate) -> Result<UserRecord> {
        (**self).update(id, updates).await
    }
}
