//! Bearer identity for API requests.
//!
//! Every route except `/` and `/health` requires an `Authorization: Bearer
//! <token>` header. Tokens are resolved to a [`User`] by an
//! [`IdentityProvider`]; [`StaticTokens`] serves the tokens listed in the
//! `auth` section of the config file.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use pilot_ledger_core::Store;
use pilot_ledger_core::config::AuthConfig;
use pilot_ledger_types::{User, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// Resolves bearer tokens to users.
pub trait IdentityProvider: Send + Sync {
    /// The user a token belongs to, or `None` if the token is unknown.
    fn resolve(&self, token: &str) -> Option<User>;
}

/// Fixed token table loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokens {
    users: BTreeMap<String, User>,
}

impl StaticTokens {
    /// Build the table from the config's `auth.tokens` map.
    pub fn from_config(config: &AuthConfig) -> Self {
        let now = Utc::now();
        let users = config
            .tokens
            .iter()
            .map(|(token, entry)| {
                let user = User {
                    id: UserId::from(entry.user_id),
                    discord_id: None,
                    discord_username: None,
                    display_name: entry.display_name.clone(),
                    is_gm: entry.is_gm,
                    created_at: now,
                    updated_at: now,
                };
                (token.clone(), user)
            })
            .collect();
        Self { users }
    }

    /// Register a token.
    #[must_use]
    pub fn with_user(mut self, token: &str, user: User) -> Self {
        self.users.insert(token.to_owned(), user);
        self
    }
}

impl IdentityProvider for StaticTokens {
    fn resolve(&self, token: &str) -> Option<User> {
        self.users.get(token).cloned()
    }
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    /// Reject callers without GM privileges.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] for non-GM users.
    pub fn require_gm(&self) -> Result<&User, ApiError> {
        if self.0.is_gm {
            Ok(&self.0)
        } else {
            Err(ApiError::Forbidden(String::from("GM access required")))
        }
    }
}

impl<S: Store> FromRequestParts<Arc<AppState<S>>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::Unauthorized(String::from("missing authorization header")))?;
        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::Unauthorized(String::from("invalid authorization header"))
            })?;

        state
            .identity
            .resolve(token.trim())
            .map(Self)
            .ok_or_else(|| ApiError::Unauthorized(String::from("invalid token")))
    }
}
