//! Tessera Session Cache
//!
//! - One current user (or none), owned in memory
//! - Every change is mirrored to a durable slot and broadcast to subscribers
//! - The slot is read once at startup to restore the previous session
//! - Logout starts a new epoch; results of calls begun before it are dropped

mod error;
mod options;
mod outcome;
mod store;

pub use error::SessionError;
pub use options::{SessionOptions, DEFAULT_AVATAR, DEFAULT_STORAGE_KEY};
pub use outcome::EditOutcome;
pub use store::SessionStore;

pub type Result<T> = std::result::Result<T, SessionError>;
