//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] tessera_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] tessera_session::SessionError),

    #[error("Auth API error: {0}")]
    Api(#[from] tessera_auth::ApiError),

    #[error("Configuration error: {0}")]
    Config(String),
}
