//! In-process authentication backend

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::api::AuthApi;
use crate::error::ApiError;
use crate::user::{Credentials, NewUser, ProfileUpdate, UserId, UserRecord};
use crate::Result;

/// Keeps users in a list and behaves like a json-server collection:
/// login matches on the `email` and `senha` fields, register assigns
/// numeric ids and update merges fields into the stored record.
#[derive(Debug)]
pub struct MemoryAuthApi {
    users: RwLock<Vec<UserRecord>>,
    next_id: AtomicI64,
}

impl MemoryAuthApi {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Seed with existing records, e.g. `{"id": "1", "email": .., "senha": ..}`.
    pub fn with_users<I>(users: I) -> Self
    where
        I: IntoIterator<Item = UserRecord>,
    {
        let users: Vec<UserRecord> = users.into_iter().collect();
        let next_id = users
            .iter()
            .filter_map(|u| match u.id {
                UserId::Number(n) => Some(n + 1),
                UserId::Text(_) => None,
            })
            .max()
            .unwrap_or(1);

        Self {
            users: RwLock::new(users),
            next_id: AtomicI64::new(next_id),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    pub fn get(&self, id: &UserId) -> Option<UserRecord> {
        self.users.read().iter().find(|u| &u.id == id).cloned()
    }
}

impl Default for MemoryAuthApi {
    fn default() -> Self {
        Self::new()
    }
}

fn field_is(user: &UserRecord, key: &str, expected: &str) -> bool {
    user.field(key).and_then(Value::as_str) == Some(expected)
}

#[async_trait]
impl AuthApi for MemoryAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|u| {
                field_is(u, "email", &credentials.email)
                    && field_is(u, "senha", &credentials.password)
            })
            .cloned())
    }

    async fn register(&self, profile: &NewUser) -> Result<UserRecord> {
        let mut users = self.users.write();

        if let Some(email) = profile.fields.get("email").and_then(Value::as_str) {
            if users.iter().any(|u| field_is(u, "email", email)) {
                return Err(ApiError::Rejected(format!(
                    "email already registered: {}",
                    email
                )));
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut fields = profile.fields.clone();
        fields.remove("id");
        fields.remove("avatar");

        let user = UserRecord {
            id: UserId::Number(id),
            avatar: profile.effective_avatar().unwrap_or_default().to_string(),
            fields,
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn update(&self, id: &UserId, updates: &ProfileUpdate) -> Result<UserRecord> {
        let mut users = self.users.write();
        let user = users
            .iter_mut()
            .find(|u| &u.id == id)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                body: format!("user {} not found", id),
            })?;

        for (key, value) in updates.iter() {
            match key.as_str() {
                "id" => {}
                "avatar" => user.avatar = value.as_str().unwrap_or_default().to_string(),
                _ => {
                    user.fields.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alice() -> UserRecord {
        UserRecord::new(1_i64)
            .with_field("nome", "Alice")
            .with_field("email", "alice@example.com")
            .with_field("senha", "secret")
    }

    #[tokio::test]
    async fn test_login_matches_email_and_password() {
        let api = MemoryAuthApi::with_users([alice()]);

        let found = api
            .login(&Credentials::new("alice@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(UserId::Number(1)));

        let missing = api
            .login(&Credentials::new("alice@example.com", "nope"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_register_assigns_next_id_and_rejects_duplicates() {
        let api = MemoryAuthApi::with_users([alice()]);

        let bob = api
            .register(&NewUser::new().with_field("email", "bob@example.com"))
            .await
            .unwrap();
        assert_eq!(bob.id, UserId::Number(2));
        assert_eq!(api.user_count(), 2);

        let dup = api
            .register(&NewUser::new().with_field("email", "alice@example.com"))
            .await;
        assert!(matches!(dup, Err(ApiError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let api = MemoryAuthApi::with_users([alice()]);

        let updated = api
            .update(
                &UserId::Number(1),
                &ProfileUpdate::new()
                    .with_field("nome", "Alicia")
                    .with_field("avatar", "new.png"),
            )
            .await
            .unwrap();

        assert_eq!(updated.field("nome"), Some(&json!("Alicia")));
        assert_eq!(updated.field("email"), Some(&json!("alice@example.com")));
        assert_eq!(updated.avatar, "new.png");

        let missing = api
            .update(&UserId::Number(99), &ProfileUpdate::new())
            .await;
        assert!(matches!(missing, Err(ApiError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_register_keeps_reserved_keys_out_of_fields() {
        let api = MemoryAuthApi::new();
        let mut profile = NewUser::new()
            .with_field("avatar", "me.png")
            .with_field("nome", "Bob");
        profile.fields.insert("id".to_string(), json!("client-chosen"));

        let user = api.register(&profile).await.unwrap();

        assert_eq!(user.id, UserId::Number(1));
        assert_eq!(user.avatar, "me.png");
        assert!(user.field("id").is_none());

        let raw = serde_json::to_string(&user).unwrap();
        let parsed: UserRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, user);
    }
}
