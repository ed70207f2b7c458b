//! Session store options

/// Slot name the logged-in user is mirrored under.
pub const DEFAULT_STORAGE_KEY: &str = "usuario";

/// Avatar used when the remote system has none for a user.
pub const DEFAULT_AVATAR: &str = "/assets/images/images.png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub storage_key: String,
    pub default_avatar: String,
}

impl SessionOptions {
    pub fn new(storage_key: impl Into<String>, default_avatar: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            default_avatar: default_avatar.into(),
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_KEY, DEFAULT_AVATAR)
    }
}
