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

//! Access/ID token verification against the tenant's signing keys.

use std::sync::Arc;

use auth0_types::TokenType;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

use super::jwks::KeyResolver;

#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token header has no kid")]
    MissingKeyId,

    #[error("no signing key for kid {0}")]
    UnknownKey(String),

    #[error("key set unavailable: {0}")]
    KeySet(String),

    #[error("invalid token: {0}")]
    Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err.to_string()),
        }
    }
}

/// Verifies tokens minted by one Auth0 tenant for one client.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<dyn KeyResolver>,
    issuer: String,
    audience: String,
    client_id: String,
}

impl TokenVerifier {
    pub fn new(
        keys: Arc<dyn KeyResolver>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
            client_id: client_id.into(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Validate signature, `exp`, `iss` and `aud`, returning the claims.
    ///
    /// Access tokens must carry the configured API audience; ID tokens the
    /// client ID.
    pub async fn decode(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> Result<Map<String, Value>, TokenError> {
        let header = decode_header(token)?;
        let kid = header.kid.as_deref().ok_or(TokenError::MissingKeyId)?;
        let (alg, key) = self.keys.resolve(kid).await?;

        let audience = match token_type {
            TokenType::Access => &self.audience,
            TokenType::Id => &self.client_id,
        };

        let mut validation = Validation::new(alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[audience]);
        validation.validate_exp = true;

        Ok(decode::<Map<String, Value>>(token, &key, &validation)?.claims)
    }

    /// `true` when [`decode`](Self::decode) succeeds.
    pub async fn is_valid(&self, token: &str, token_type: TokenType) -> bool {
        self.decode(token, token_type).await.is_ok()
    }
}
