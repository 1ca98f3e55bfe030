//! Identity provider client.
//!
//! Sign-in happens upstream; requests reach the dashboard with trusted
//! identity headers (see [`crate::middleware::identity`]). This client only
//! reads user profiles for the admin views.
//!
//! # API Reference
//!
//! - `GET {IDENTITY_API_URL}/v1/users?limit=&offset=` - page of users
//! - `GET {IDENTITY_API_URL}/v1/users/{id}` - single user
//! - Authentication: `Authorization: Bearer <secret key>`

mod types;

pub use types::*;

use std::sync::Arc;

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use ser_core::{UserId, UserProfile};

use crate::config::IdentityConfig;

/// Users requested per page when listing.
const PAGE_LIMIT: usize = 100;

/// Upper bound on pages fetched by [`IdentityClient::list_users`].
const MAX_PAGES: usize = 50;

/// Errors that can occur when interacting with the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the provider.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// User not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to build a request or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unauthorized (invalid secret key).
    #[error("Unauthorized: invalid secret key")]
    Unauthorized,
}

/// Identity provider API client.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns error if the secret key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();
        let mut auth_value =
            HeaderValue::from_str(&format!("Bearer {}", config.secret_key.expose_secret()))
                .map_err(|e| IdentityError::Parse(format!("Invalid secret key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, IdentityError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| IdentityError::Parse("identity API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Every user known to the provider.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if any page request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, IdentityError> {
        let now = Utc::now();
        let mut profiles = Vec::new();

        for page in 0..MAX_PAGES {
            let mut url = self.endpoint(&["v1", "users"])?;
            url.query_pairs_mut()
                .append_pair("limit", &PAGE_LIMIT.to_string())
                .append_pair("offset", &(page * PAGE_LIMIT).to_string());

            let response = self.inner.client.get(url).send().await?;
            let users: Vec<IdentityUser> = self.handle_response(response).await?;
            let fetched = users.len();
            profiles.extend(users.into_iter().map(|u| u.into_profile(now)));

            if fetched < PAGE_LIMIT {
                break;
            }
        }

        tracing::debug!(count = profiles.len(), "Fetched identity users");
        Ok(profiles)
    }

    /// One user by id.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::NotFound` for an unknown id, or another
    /// `IdentityError` if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(&self, user_id: &UserId) -> Result<UserProfile, IdentityError> {
        let url = self.endpoint(&["v1", "users", user_id.as_str()])?;
        let response = self.inner.client.get(url).send().await?;
        let user: IdentityUser = self.handle_response(response).await?;
        Ok(user.into_profile(Utc::now()))
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, IdentityError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| IdentityError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(self.parse_error(response).await)
    }

    /// Parse error response from the identity provider.
    async fn parse_error(&self, response: reqwest::Response) -> IdentityError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return IdentityError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return IdentityError::Unauthorized;
        }

        if status == 404 {
            return IdentityError::NotFound(response.url().path().to_string());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        IdentityError::Api { status, message }
    }
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client(base: &str) -> IdentityClient {
        IdentityClient::new(&IdentityConfig {
            api_url: Url::parse(base).unwrap(),
            secret_key: SecretString::from("sk_test_aB3xY9mK2nL5pQ7rT0uW4zC6"),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let url = client("https://api.identity.test")
            .endpoint(&["v1", "users", "user_123"])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.identity.test/v1/users/user_123");
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let url = client("https://api.identity.test/")
            .endpoint(&["v1", "users", "../admin"])
            .unwrap();
        assert_eq!(url.path(), "/v1/users/..%2Fadmin");
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", client("https://api.identity.test"));
        assert!(!debug.contains("sk_test"));
    }
}
