//! Tessera Core
//!
//! Composition root for the session cache: configuration, logging and the
//! `AuthProvider` handed to every consumer of the current user.

mod config;
mod error;
mod provider;

pub use config::Config;
pub use error::CoreError;
pub use provider::AuthProvider;

// Re-export core components
pub use tessera_auth::{
    ApiError, AuthApi, Credentials, HttpAuthApi, MemoryAuthApi, NewUser, ProfileUpdate, UserId,
    UserRecord,
};
pub use tessera_session::{EditOutcome, SessionError, SessionOptions, SessionStore};
pub use tessera_storage::{Database, KeyValueStore, MemoryStore, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
