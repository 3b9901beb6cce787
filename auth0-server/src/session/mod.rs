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

//! Session adapter: stores the user's [`UserCredentials`] under one key of an
//! opaque server-side session reached through the request's `Cookie` header.
//!
//! The backend is abstract ([`SessionStorage`]); this module only reads and
//! writes a single named value inside it.

mod memory;

pub use memory::{CookieOptions, MemorySessionStorage};

use std::sync::Arc;

use async_trait::async_trait;
use auth0_types::UserCredentials;
use axum::http::{header, HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to encode session value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("session cookie is not a valid header value")]
    InvalidCookie,

    #[error("session backend error: {0}")]
    Backend(String),
}

/// Session data read from a backend. `id` is `None` until first committed.
#[derive(Debug, Clone, Default)]
pub struct Session {
    id: Option<String>,
    data: Map<String, Value>,
}

impl Session {
    pub fn new(id: Option<String>, data: Map<String, Value>) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Map<String, Value>) {
        (self.id, self.data)
    }
}

/// A session backend: look a session up by cookie, commit it back to a cookie.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Resolve the session referenced by a raw `Cookie` header value.
    /// A missing or unknown cookie yields an empty session.
    async fn get_session(&self, cookie_header: Option<&str>) -> Result<Session, SessionError>;

    /// Persist `session` and return the `Set-Cookie` value referencing it.
    async fn commit_session(&self, session: Session) -> Result<String, SessionError>;

    /// Drop `session` and return a `Set-Cookie` value that clears it.
    async fn destroy_session(&self, session: Session) -> Result<String, SessionError>;
}

/// A session backend together with the key holding the credentials.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    key: String,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Join every `Cookie` header of a request into one header value.
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

/// Store `credentials` in the session referenced by the request headers.
///
/// Returns the headers to attach to the response (`Set-Cookie`). Without a
/// store this is a no-op that logs a warning and returns no headers, which
/// suits deployments that hand credentials back to the caller instead.
pub async fn save_user_to_session(
    request_headers: &HeaderMap,
    credentials: &UserCredentials,
    store: Option<&SessionStore>,
) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    let Some(store) = store else {
        tracing::warn!("No session store configured; credentials were not persisted");
        return Ok(headers);
    };

    let cookie = cookie_header(request_headers);
    let mut session = store.storage.get_session(cookie.as_deref()).await?;
    session.set(store.key.clone(), serde_json::to_value(credentials)?);
    let set_cookie = store.storage.commit_session(session).await?;

    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&set_cookie).map_err(|_| SessionError::InvalidCookie)?,
    );
    Ok(headers)
}

/// Read the credentials stored in the session referenced by the request headers.
///
/// `None` when no store is configured, the key is absent, or the stored value
/// is not a credentials object.
pub async fn get_credentials(
    request_headers: &HeaderMap,
    store: Option<&SessionStore>,
) -> Result<Option<UserCredentials>, SessionError> {
    let Some(store) = store else {
        return Ok(None);
    };

    let cookie = cookie_header(request_headers);
    let session = store.storage.get_session(cookie.as_deref()).await?;
    let Some(value) = session.get(&store.key) else {
        return Ok(None);
    };

    match serde_json::from_value(value.clone()) {
        Ok(credentials) => Ok(Some(credentials)),
        Err(e) => {
            tracing::warn!("Ignoring malformed credentials under session key {:?}: {e}", store.key);
            Ok(None)
        }
    }
}

/// Clear the session referenced by the request headers, returning the
/// `Set-Cookie` header that expires it. Without a store, no headers.
pub async fn destroy_session(
    request_headers: &HeaderMap,
    store: Option<&SessionStore>,
) -> Result<HeaderMap, SessionError> {
    let mut headers = HeaderMap::new();
    let Some(store) = store else {
        return Ok(headers);
    };

    let cookie = cookie_header(request_headers);
    let session = store.storage.get_session(cookie.as_deref()).await?;
    let set_cookie = store.storage.destroy_session(session).await?;
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&set_cookie).map_err(|_| SessionError::InvalidCookie)?,
    );
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;

    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn credentials() -> UserCredentials {
        UserCredentials::issued_at("access".into(), Some("refresh".into()), 3600, 1_000)
    }

    fn store() -> SessionStore {
        SessionStore::new(
            Arc::new(MemorySessionStorage::new(CookieOptions::default())),
            "user",
        )
    }

    fn request_with_cookie(set_cookie: &HeaderValue) -> HeaderMap {
        let pair = set_cookie
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&pair).unwrap());
        headers
    }

    #[tokio::test]
    async fn save_without_store_warns_once_and_returns_no_headers() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let headers = save_user_to_session(&HeaderMap::new(), &credentials(), None)
            .await
            .unwrap();

        assert!(headers.is_empty());
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn save_with_store_returns_set_cookie_and_round_trips() {
        let store = store();
        let headers = save_user_to_session(&HeaderMap::new(), &credentials(), Some(&store))
            .await
            .unwrap();

        let set_cookie = headers.get(header::SET_COOKIE).expect("Set-Cookie header");
        assert!(set_cookie.to_str().unwrap().starts_with("__session="));

        let request = request_with_cookie(set_cookie);
        let loaded = get_credentials(&request, Some(&store)).await.unwrap();
        assert_eq!(loaded, Some(credentials()));
    }

    #[tokio::test]
    async fn get_credentials_without_store_is_none() {
        let loaded = get_credentials(&HeaderMap::new(), None).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn get_credentials_without_cookie_is_none() {
        let loaded = get_credentials(&HeaderMap::new(), Some(&store()))
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn get_credentials_with_other_key_is_none() {
        let storage = Arc::new(MemorySessionStorage::new(CookieOptions::default()));
        let writer = SessionStore::new(storage.clone(), "user");
        let reader = SessionStore::new(storage, "someone-else");

        let headers = save_user_to_session(&HeaderMap::new(), &credentials(), Some(&writer))
            .await
            .unwrap();
        let request = request_with_cookie(headers.get(header::SET_COOKIE).unwrap());

        assert!(get_credentials(&request, Some(&reader)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn destroyed_session_no_longer_yields_credentials() {
        let store = store();
        let headers = save_user_to_session(&HeaderMap::new(), &credentials(), Some(&store))
            .await
            .unwrap();
        let request = request_with_cookie(headers.get(header::SET_COOKIE).unwrap());

        let cleared = destroy_session(&request, Some(&store)).await.unwrap();
        let clear_cookie = cleared.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(clear_cookie.contains("Max-Age=0"));

        assert!(get_credentials(&request, Some(&store)).await.unwrap().is_none());
    }

    #[test]
    fn multiple_cookie_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2"));
        assert_eq!(cookie_header(&headers).as_deref(), Some("a=1; b=2"));
    }
}
