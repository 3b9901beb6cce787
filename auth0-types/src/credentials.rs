/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Client and user credentials.
//!
//! [`UserCredentials`] is the only value this system stores in the session.
//! It is serialized with camelCase field names so sessions written by other
//! Auth0 integrations sharing the same store remain readable.

use serde::{Deserialize, Serialize};

/// Static client configuration registered with Auth0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    /// API identifier requested as the `audience` of access tokens.
    pub audience: String,
    /// Auth0 organization ID, forwarded on the authorize request when set.
    pub organization: Option<String>,
}

/// Tokens obtained from a code or refresh-token exchange.
///
/// # Example payload
///
/// ```json
/// {
///   "accessToken": "eyJ...",
///   "refreshToken": "v1.M...",
///   "expiresIn": 86400,
///   "expiresAt": 1707004800000,
///   "lastRefreshed": 1706918400000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredentials {
    pub access_token: String,

    /// Only present when refresh-token rotation is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds, as reported by the token endpoint.
    pub expires_in: i64,

    /// Expiry instant in epoch milliseconds.
    pub expires_at: i64,

    /// Epoch milliseconds at which the tokens were obtained.
    pub last_refreshed: i64,
}

impl UserCredentials {
    /// Build credentials for tokens obtained at `now_ms`.
    pub fn issued_at(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
        now_ms: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
            expires_at: now_ms.saturating_add(expires_in.saturating_mul(1000)),
            last_refreshed: now_ms,
        }
    }
}

/// Which kind of token is being verified. Determines the expected audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Access token: audience is the configured API identifier.
    Access,
    /// ID token: audience is the client ID.
    Id,
}
