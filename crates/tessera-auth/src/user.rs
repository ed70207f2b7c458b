//! User record and request payloads

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque identifier assigned by the remote system.
///
/// Remote collections hand out either strings or integers; the original form
/// is kept so a stored record serializes back byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId::Text(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId::Text(s)
    }
}

impl From<i64> for UserId {
    fn from(n: i64) -> Self {
        UserId::Number(n)
    }
}

/// Keys owned by `UserRecord` itself; never emitted from `fields`.
const RESERVED_KEYS: [&str; 2] = ["id", "avatar"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    /// Stable key assigned by the remote system
    pub id: UserId,
    /// Avatar URI or path. Empty means "not set".
    #[serde(default, deserialize_with = "deserialize_avatar")]
    pub avatar: String,
    /// Remaining profile fields (name, email, ...)
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Serialize for UserRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("avatar", &self.avatar)?;
        for (key, value) in &self.fields {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl UserRecord {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            avatar: String::new(),
            fields: Map::new(),
        }
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }

    /// Set a profile field. `"id"` and `"avatar"` go to their own fields;
    /// an id value that is neither a string nor an integer is ignored.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            "id" => {
                if let Ok(id) = serde_json::from_value(value) {
                    self.id = id;
                }
            }
            "avatar" => self.avatar = value.as_str().unwrap_or_default().to_string(),
            _ => {
                self.fields.insert(key, value);
            }
        }
        self
    }

    pub fn has_avatar(&self) -> bool {
        !self.avatar.is_empty()
    }

    /// Fill a missing avatar with `default_avatar`. A set avatar is left alone.
    pub fn normalize(&mut self, default_avatar: &str) {
        if !self.has_avatar() {
            self.avatar = default_avatar.to_string();
        }
    }

    pub fn normalized(mut self, default_avatar: &str) -> Self {
        self.normalize(default_avatar);
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// `null`, a missing key and `""` all mean "no avatar".
fn deserialize_avatar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Login credentials. No client-side format validation is applied.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NewUser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Set a profile field. `"avatar"` goes to the avatar slot.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if key == "avatar" {
            self.avatar = value.as_str().map(str::to_string);
        } else {
            self.fields.insert(key, value);
        }
        self
    }

    /// The avatar to send: the dedicated slot first, then a stray
    /// `"avatar"` entry in `fields`.
    pub fn effective_avatar(&self) -> Option<&str> {
        self.avatar
            .as_deref()
            .or_else(|| self.fields.get("avatar").and_then(Value::as_str))
    }

    pub fn normalize(&mut self, default_avatar: &str) {
        let stray = self.fields.remove("avatar");
        if self.avatar.is_none() {
            self.avatar = stray.and_then(|v| v.as_str().map(str::to_string));
        }

        let missing = self.avatar.as_deref().map_or(true, str::is_empty);
        if missing {
            self.avatar = Some(default_avatar.to_string());
        }
    }
}

impl Serialize for NewUser {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(avatar) = self.effective_avatar() {
            map.serialize_entry("avatar", avatar)?;
        }
        for (key, value) in &self.fields {
            if key != "avatar" {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// Fields to change on an existing user. Sent as-is; the remote system
/// answers with the complete record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileUpdate(pub Map<String, Value>);

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEFAULT: &str = "/assets/images/images.png";

    #[test]
    fn test_missing_null_and_empty_avatar_are_absent() {
        for raw in [
            r#"{"id":"1","nome":"A"}"#,
            r#"{"id":"1","nome":"A","avatar":null}"#,
            r#"{"id":"1","nome":"A","avatar":""}"#,
        ] {
            let user: UserRecord = serde_json::from_str(raw).unwrap();
            assert!(!user.has_avatar(), "{raw}");
            assert_eq!(user.field("nome"), Some(&json!("A")));
        }
    }

    #[test]
    fn test_normalize_fills_only_missing_avatar() {
        let user = UserRecord::new("1").normalized(DEFAULT);
        assert_eq!(user.avatar, DEFAULT);

        let user = UserRecord::new("1")
            .with_avatar("https://cdn.example.com/me.png")
            .normalized(DEFAULT);
        assert_eq!(user.avatar, "https://cdn.example.com/me.png");
    }

    #[test]
    fn test_id_keeps_original_form() {
        let numeric: UserRecord = serde_json::from_str(r#"{"id":7}"#).unwrap();
        assert_eq!(numeric.id, UserId::Number(7));
        assert_eq!(numeric.id.to_string(), "7");

        let text: UserRecord = serde_json::from_str(r#"{"id":"a7"}"#).unwrap();
        assert_eq!(text.id, UserId::Text("a7".to_string()));

        let out = serde_json::to_value(&numeric.normalized(DEFAULT)).unwrap();
        assert_eq!(out["id"], json!(7));
    }

    #[test]
    fn test_serialization_is_stable_for_normalized_records() {
        let user = UserRecord::new("1")
            .with_field("nome", "A")
            .with_field("email", "a@example.com")
            .with_field("tags", json!(["x", "y"]))
            .normalized(DEFAULT);

        let first = serde_json::to_string(&user).unwrap();
        let parsed: UserRecord = serde_json::from_str(&first).unwrap();
        assert_eq!(parsed, user);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), first);
    }

    #[test]
    fn test_id_is_required() {
        assert!(serde_json::from_str::<UserRecord>(r#"{"nome":"A"}"#).is_err());
    }

    #[test]
    fn test_new_user_normalize() {
        let mut profile = NewUser::new().with_field("nome", "A");
        profile.normalize(DEFAULT);
        assert_eq!(profile.avatar.as_deref(), Some(DEFAULT));

        let mut profile = NewUser::new().with_avatar("");
        profile.normalize(DEFAULT);
        assert_eq!(profile.avatar.as_deref(), Some(DEFAULT));

        let mut profile = NewUser::new().with_avatar("mine.png");
        profile.normalize(DEFAULT);
        assert_eq!(profile.avatar.as_deref(), Some("mine.png"));
    }

    #[test]
    fn test_credentials_wire_names_and_redaction() {
        let creds = Credentials::new("a@example.com", "hunter2");
        let value = serde_json::to_value(&creds).unwrap();
        assert_eq!(value, json!({"email": "a@example.com", "senha": "hunter2"}));

        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_profile_update_is_a_plain_object() {
        let update = ProfileUpdate::new().with_field("nome", "B");
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"nome": "B"}));
    }

    #[test]
    fn test_reserved_keys_route_to_their_fields() {
        let user = UserRecord::new("1")
            .with_field("avatar", "x.png")
            .with_field("id", 42)
            .with_field("nome", "A");

        assert_eq!(user.avatar, "x.png");
        assert_eq!(user.id, UserId::Number(42));
        assert!(user.field("avatar").is_none());
        assert!(user.field("id").is_none());

        let ignored = UserRecord::new("1").with_field("id", true);
        assert_eq!(ignored.id, UserId::from("1"));
    }

    #[test]
    fn test_record_with_reserved_keys_round_trips() {
        let mut user = UserRecord::new("1")
            .with_field("avatar", "x.png")
            .normalized(DEFAULT);
        // Keys written straight into the map must not shadow the real ones
        user.fields.insert("avatar".to_string(), json!("stray.png"));
        user.fields.insert("id".to_string(), json!("stray"));

        let raw = serde_json::to_string(&user).unwrap();
        assert_eq!(raw.matches("\"avatar\"").count(), 1);
        assert_eq!(raw.matches("\"id\"").count(), 1);

        let parsed: UserRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.id, UserId::from("1"));
        assert_eq!(parsed.avatar, "x.png");
        assert_eq!(serde_json::to_string(&parsed).unwrap(), raw);
    }

    #[test]
    fn test_new_user_avatar_field_is_sent_once() {
        let profile = NewUser::new()
            .with_field("avatar", "me.png")
            .with_field("nome", "A");
        assert_eq!(profile.avatar.as_deref(), Some("me.png"));
        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            json!({"avatar": "me.png", "nome": "A"})
        );

        let mut stray = NewUser::new();
        stray.fields.insert("avatar".to_string(), json!("stray.png"));
        assert_eq!(
            serde_json::to_string(&stray).unwrap(),
            r#"{"avatar":"stray.png"}"#
        );

        stray.normalize(DEFAULT);
        assert_eq!(stray.avatar.as_deref(), Some("stray.png"));
        assert!(stray.fields.is_empty());
    }
}
