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

//! Signing-key resolution: the [`KeyResolver`] seam and a JWKS-backed cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use tokio::sync::RwLock;
use url::Url;

use super::verify::TokenError;

/// Minimum interval between JWKS refreshes (5 minutes).
const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Resolves the verification key for a token's `kid`.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, kid: &str) -> Result<(Algorithm, DecodingKey), TokenError>;
}

/// A JWK entry from the JWKS endpoint.
#[derive(Debug, Deserialize)]
struct JwkEntry {
    kid: Option<String>,
    kty: String,
    #[serde(default)]
    alg: Option<String>,
    // RSA
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
    // EC
    #[serde(default)]
    crv: Option<String>,
    #[serde(default)]
    x: Option<String>,
    #[serde(default)]
    y: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<JwkEntry>,
}

/// Keys fetched from the tenant's `/.well-known/jwks.json`, refreshed when an
/// unknown `kid` shows up (at most once per [`JWKS_REFRESH_INTERVAL`]).
pub struct JwksCache {
    keys: RwLock<HashMap<String, (Algorithm, DecodingKey)>>,
    jwks_url: Url,
    http: reqwest::Client,
    last_refresh: RwLock<Option<Instant>>,
}

impl JwksCache {
    pub fn new(jwks_url: Url, http: reqwest::Client) -> Arc<Self> {
        Arc::new(Self {
            keys: RwLock::new(HashMap::new()),
            jwks_url,
            http,
            last_refresh: RwLock::new(None),
        })
    }

    /// Fetch the JWKS document and replace the cached keys. Rate-limited.
    async fn refresh(&self) -> Result<(), TokenError> {
        if let Some(last) = *self.last_refresh.read().await {
            if last.elapsed() < JWKS_REFRESH_INTERVAL {
                return Ok(());
            }
        }

        let resp = self
            .http
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(|e| TokenError::KeySet(format!("JWKS fetch failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(TokenError::KeySet(format!(
                "JWKS fetch returned HTTP {}",
                resp.status()
            )));
        }

        let doc: JwksDocument = resp
            .json()
            .await
            .map_err(|e| TokenError::KeySet(format!("failed to parse JWKS: {e}")))?;

        let mut new_keys = HashMap::new();
        for jwk in &doc.keys {
            let Some(kid) = jwk.kid.clone() else {
                continue;
            };
            match decoding_key(jwk) {
                Ok(Some(key)) => {
                    new_keys.insert(kid, (jwk_algorithm(jwk), key));
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping unusable JWK {kid}: {e}"),
            }
        }

        tracing::debug!("Loaded {} signing keys from {}", new_keys.len(), self.jwks_url);
        *self.keys.write().await = new_keys;
        *self.last_refresh.write().await = Some(Instant::now());
        Ok(())
    }
}

#[async_trait]
impl KeyResolver for JwksCache {
    async fn resolve(&self, kid: &str) -> Result<(Algorithm, DecodingKey), TokenError> {
        if let Some((alg, key)) = self.keys.read().await.get(kid) {
            return Ok((*alg, key.clone()));
        }

        self.refresh().await?;

        self.keys
            .read()
            .await
            .get(kid)
            .map(|(alg, key)| (*alg, key.clone()))
            .ok_or_else(|| TokenError::UnknownKey(kid.to_string()))
    }
}

/// Build a decoding key from a JWK; `Ok(None)` for key types we do not use.
fn decoding_key(jwk: &JwkEntry) -> Result<Option<DecodingKey>, jsonwebtoken::errors::Error> {
    match jwk.kty.as_str() {
        "RSA" => match (jwk.n.as_deref(), jwk.e.as_deref()) {
            (Some(n), Some(e)) if !n.is_empty() && !e.is_empty() => {
                DecodingKey::from_rsa_components(n, e).map(Some)
            }
            _ => Ok(None),
        },
        "EC" => match (jwk.x.as_deref(), jwk.y.as_deref()) {
            (Some(x), Some(y)) if !x.is_empty() && !y.is_empty() => {
                DecodingKey::from_ec_components(x, y).map(Some)
            }
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Determine the JWT algorithm for a JWK entry.
fn jwk_algorithm(jwk: &JwkEntry) -> Algorithm {
    match jwk.alg.as_deref() {
        Some("RS384") => Algorithm::RS384,
        Some("RS512") => Algorithm::RS512,
        Some("ES256") => Algorithm::ES256,
        Some("ES384") => Algorithm::ES384,
        Some("RS256") => Algorithm::RS256,
        _ => match (jwk.kty.as_str(), jwk.crv.as_deref()) {
            ("EC", Some("P-384")) => Algorithm::ES384,
            ("EC", _) => Algorithm::ES256,
            _ => Algorithm::RS256,
        },
    }
}

/// A fixed set of keys. Useful for pinned keys and as a test double.
#[derive(Clone, Default)]
pub struct StaticKeySet {
    keys: HashMap<String, (Algorithm, DecodingKey)>,
}

impl StaticKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, kid: impl Into<String>, alg: Algorithm, key: DecodingKey) -> Self {
        self.keys.insert(kid.into(), (alg, key));
        self
    }
}

#[async_trait]
impl KeyResolver for StaticKeySet {
    async fn resolve(&self, kid: &str) -> Result<(Algorithm, DecodingKey), TokenError> {
        self.keys
            .get(kid)
            .map(|(alg, key)| (*alg, key.clone()))
            .ok_or_else(|| TokenError::UnknownKey(kid.to_string()))
    }
}
