//! Identity provider response types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use ser_core::{UserId, UserProfile};

/// Role assigned to users without one.
pub const DEFAULT_ROLE: &str = "user";

/// A user object from the provider API.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub public_metadata: PublicMetadata,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub last_sign_in_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailAddress {
    pub email_address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicMetadata {
    #[serde(default)]
    pub role: Option<String>,
}

impl IdentityUser {
    /// Convert to a profile. Users who never signed in count as active `now`.
    #[must_use]
    pub fn into_profile(self, now: DateTime<Utc>) -> UserProfile {
        let last_active = self
            .last_sign_in_at
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(now);

        UserProfile {
            id: UserId::new(self.id),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self
                .email_addresses
                .into_iter()
                .next()
                .map(|e| e.email_address)
                .unwrap_or_default(),
            image_url: self.image_url.unwrap_or_default(),
            role: self
                .public_metadata
                .role
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            last_active,
        }
    }
}
