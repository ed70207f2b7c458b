//! Result of a profile edit

use tessera_auth::{ApiError, UserRecord};

/// Profile edits never return `Err`. Failures are logged and reported here
/// so callers can react without the edit path raising.
#[derive(Debug)]
pub enum EditOutcome {
    /// The remote update succeeded and the new record is current.
    Updated(UserRecord),
    /// Nobody was logged in; nothing was sent.
    SkippedLoggedOut,
    /// The remote update failed; the session is unchanged.
    Failed(ApiError),
    /// The user logged out while the update was in flight.
    Superseded,
}

impl EditOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, EditOutcome::Updated(_))
    }

    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            EditOutcome::Updated(user) => Some(user),
            _ => None,
        }
    }
}
