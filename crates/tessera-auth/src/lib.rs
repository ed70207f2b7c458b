//! Tessera Auth
//!
//! The remote authentication boundary:
//! - `UserRecord` and the payloads sent to the remote system
//! - `AuthApi`, the login/register/update contract
//! - `HttpAuthApi`, a REST adapter for a json-server style user collection
//! - `MemoryAuthApi`, an in-process backend for tests and offline hosts

mod api;
mod error;
mod http;
mod memory;
mod user;

pub use api::AuthApi;
pub use error::ApiError;
pub use http::{HttpAuthApi, DEFAULT_RESOURCE};
pub use memory::MemoryAuthApi;
pub use user::{Credentials, NewUser, ProfileUpdate, UserId, UserRecord};

pub type Result<T> = std::result::Result<T, ApiError>;
