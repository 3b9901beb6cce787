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

//! Shared test helpers for auth0-server integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, OnceLock};

use auth0_server::auth0_types::{ClientCredentials, UserCredentials};
use auth0_server::oauth::StaticKeySet;
use auth0_server::session::{CookieOptions, MemorySessionStorage};
use auth0_server::{Auth0, Auth0Config, AuthRedirect};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use serde::de::DeserializeOwned;
use wiremock::MockServer;

pub const KID: &str = "test-kid-1";
pub const CLIENT_ID: &str = "client123";
pub const CLIENT_SECRET: &str = "client-secret";
pub const AUDIENCE: &str = "https://api.example.com";
pub const CALLBACK_URL: &str = "https://app.example.com/callback";
pub const FAILED_LOGIN: &str = "/login-failed";

pub struct TestKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    /// Base64url modulus, as published in a JWKS.
    pub n: String,
    /// Base64url exponent, as published in a JWKS.
    pub e: String,
}

/// One RSA key pair per test binary; generating 2048-bit keys is slow.
pub fn keys() -> &'static TestKeys {
    static KEYS: OnceLock<TestKeys> = OnceLock::new();
    KEYS.get_or_init(|| {
        use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
        use rsa::traits::PublicKeyParts;
        use rsa::RsaPrivateKey;

        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
        let priv_pem = private_key
            .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
            .unwrap();
        let encoding = EncodingKey::from_rsa_pem(priv_pem.as_bytes()).unwrap();

        let public_key = private_key.to_public_key();
        let pub_pem = public_key
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .unwrap();
        let decoding = DecodingKey::from_rsa_pem(pub_pem.as_bytes()).unwrap();

        TestKeys {
            encoding,
            decoding,
            n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        }
    })
}

pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Sign an access token for the tenant served by `server`, expiring
/// `exp_offset_secs` from now (negative for an already expired token).
pub fn access_token(server: &MockServer, sub: &str, exp_offset_secs: i64) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KID.to_string());
    let claims = serde_json::json!({
        "sub": sub,
        "iss": format!("{}/", server.uri()),
        "aud": [AUDIENCE, format!("{}/userinfo", server.uri())],
        "iat": now_secs(),
        "exp": now_secs() + exp_offset_secs,
        "scope": "openid profile email offline_access",
    });
    encode(&header, &claims, &keys().encoding).unwrap()
}

pub fn config(server: &MockServer, rotation: bool) -> Auth0Config {
    Auth0Config {
        domain: server.uri(),
        client: ClientCredentials {
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
            audience: AUDIENCE.to_string(),
            organization: None,
        },
        callback_url: CALLBACK_URL.to_string(),
        failed_login_redirect: FAILED_LOGIN.to_string(),
        refresh_token_rotation: rotation,
        session_key: Auth0Config::DEFAULT_SESSION_KEY.to_string(),
    }
}

pub fn memory_storage() -> Arc<MemorySessionStorage> {
    Arc::new(MemorySessionStorage::new(CookieOptions::default()))
}

/// Everything the credentials callback has been handed so far.
pub type Captured = Arc<Mutex<Vec<UserCredentials>>>;

/// Build an [`Auth0`] against `server` with pinned test keys, the given
/// session storage, and a capturing credentials callback.
pub fn build_auth0(
    server: &MockServer,
    rotation: bool,
    storage: Option<Arc<MemorySessionStorage>>,
) -> (Auth0, Captured) {
    let captured: Captured = Arc::default();
    let sink = captured.clone();

    let keys = StaticKeySet::new().with_key(KID, Algorithm::RS256, keys().decoding.clone());
    let mut builder = Auth0::builder(config(server, rotation))
        .key_resolver(Arc::new(keys))
        .credentials_callback(move |c| sink.lock().unwrap().push(c.clone()));
    if let Some(storage) = storage {
        builder = builder.session_storage(storage);
    }
    (builder.build().expect("valid test config"), captured)
}

/// The `name=value` part of the first `Set-Cookie` header.
pub fn cookie_pair(headers: &HeaderMap) -> String {
    headers
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// The `name=value` part of a redirect's first `Set-Cookie` header.
pub fn redirect_cookie(redirect: &AuthRedirect) -> String {
    cookie_pair(redirect.headers())
}

/// Request headers carrying `cookie`.
pub fn cookie_headers(cookie: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
    headers
}

/// Store `credentials` in a fresh session and return its cookie.
pub async fn seed_session(auth0: &Auth0, credentials: &UserCredentials) -> String {
    let headers = auth0
        .save_user_to_session(&HeaderMap::new(), credentials)
        .await
        .expect("session save");
    cookie_pair(&headers)
}

/// Consume a response body and deserialize JSON into `T`.
pub async fn response_json<T: DeserializeOwned>(resp: Response) -> T {
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("deserialize response body")
}
