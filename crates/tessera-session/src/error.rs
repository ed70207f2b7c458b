//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid credentials")]
    Authentication,

    #[error("Registration failed: {0}")]
    Registration(#[source] tessera_auth::ApiError),

    #[error("Auth API error: {0}")]
    Api(#[from] tessera_auth::ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] tessera_storage::StorageError),

    #[error("Session ended before the request completed")]
    Superseded,
}
