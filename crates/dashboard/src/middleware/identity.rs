//! Identity extractors.
//!
//! Sign-in is handled by the upstream identity layer, which forwards the
//! caller's id and role as trusted request headers. These extractors read
//! those headers; they never re-derive authorization.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

use ser_core::UserId;

use crate::state::AppState;

/// Header carrying the signed-in user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the signed-in user's role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role value that grants admin access.
pub const ADMIN_ROLE: &str = "admin";

/// The signed-in caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub is_admin: bool,
}

impl CurrentUser {
    /// Read the caller from identity headers. `None` when no user id is set.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let id = headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())?;

        let is_admin = headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|role| role.trim().eq_ignore_ascii_case(ADMIN_ROLE));

        Some(Self {
            id: UserId::new(id),
            is_admin,
        })
    }

    /// Whether this caller may read `user_id`'s analyses.
    #[must_use]
    pub fn can_view(&self, user_id: &UserId) -> bool {
        self.is_admin || self.id == *user_id
    }
}

/// Extractor that requires a signed-in user.
///
/// Unauthenticated HTML requests are redirected to the sign-in page; `/api/`
/// requests get 401.
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when the caller is missing or lacks the admin role.
#[derive(Debug)]
pub enum IdentityRejection {
    /// Redirect to the sign-in page (for HTML requests).
    RedirectToSignIn(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in but not an admin.
    Forbidden,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignIn(url) => Redirect::to(&url).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Only admins can access this resource",
            )
                .into_response(),
        }
    }
}

fn require_user(parts: &Parts, state: &AppState) -> Result<CurrentUser, IdentityRejection> {
    let user = CurrentUser::from_headers(&parts.headers).ok_or_else(|| {
        if parts.uri.path().starts_with("/api/") {
            IdentityRejection::Unauthorized
        } else {
            IdentityRejection::RedirectToSignIn(state.config().sign_in_url.clone())
        }
    })?;
    crate::error::set_sentry_user(&user.id);
    Ok(user)
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = IdentityRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_user(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = IdentityRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = require_user(parts, state)?;
        if !user.is_admin {
            return Err(IdentityRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(CurrentUser::from_headers(&parts.headers)))
    }
}
