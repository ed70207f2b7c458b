//! REST adapter for a json-server style user collection
//!
//! - login:    `GET    {base}/{resource}?email=..&senha=..` (array of matches)
//! - register: `POST   {base}/{resource}`
//! - update:   `PATCH  {base}/{resource}/{id}`

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::api::AuthApi;
use crate::error::ApiError;
use crate::user::{Credentials, NewUser, ProfileUpdate, UserId, UserRecord};
use crate::Result;

pub const DEFAULT_RESOURCE: &str = "usuarios";

#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    base_url: Url,
    resource: String,
    client: Client,
}

impl HttpAuthApi {
    pub fn new(base_url: &str, resource: &str, timeout: Duration) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let resource = resource.trim_matches('/');
        if resource.is_empty() {
            return Err(ApiError::InvalidUrl("empty resource name".to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            resource: resource.to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self) -> Result<Url> {
        self.url_with_segments(&[self.resource.as_str()])
    }

    fn record_url(&self, id: &UserId) -> Result<Url> {
        let id = id.to_string();
        self.url_with_segments(&[self.resource.as_str(), id.as_str()])
    }

    fn url_with_segments(&self, extra: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(extra);
        Ok(url)
    }
}

/// Read the body, mapping non-2xx statuses to `ApiError::Status`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<Option<UserRecord>> {
        let mut url = self.collection_url()?;
        url.query_pairs_mut()
            .append_pair("email", &credentials.email)
            .append_pair("senha", &credentials.password);

        tracing::debug!(email = %credentials.email, "Looking up user");

        let response = self.client.get(url).send().await?;
        let matches: Vec<UserRecord> = read_json(response).await?;

        Ok(matches.into_iter().next())
    }

    async fn register(&self, profile: &NewUser) -> Result<UserRecord> {
        let url = self.collection_url()?;

        tracing::debug!(url = %url, "Registering user");

        let response = self.client.post(url).json(profile).send().await?;
        read_json(response).await
    }

    async fn update(&self, id: &UserId, updates: &ProfileUpdate) -> Result<UserRecord> {
        let url = self.record_url(id)?;

        tracing::debug!(user_id = %id, "Updating user");

        let response = self.client.patch(url).json(updates).send().await?;
        read_json(response).await
    }
}
