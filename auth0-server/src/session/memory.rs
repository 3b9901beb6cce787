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

//! In-process session backend.
//!
//! Sessions live in a map keyed by a random id; the cookie carries only the id.
//! Entries expire together with their cookie (`Max-Age`) and are pruned on
//! commit. Suitable for a single instance and for tests; state is lost on
//! restart.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Session, SessionError, SessionStorage};

/// Attributes of the session cookie.
#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub max_age_secs: i64,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: "__session".to_string(),
            path: "/".to_string(),
            domain: None,
            secure: false,
            max_age_secs: 60 * 60 * 24 * 30,
        }
    }
}

impl CookieOptions {
    /// Build a `Set-Cookie` value for `value` with the given lifetime.
    fn build(&self, value: &str, max_age_secs: i64) -> String {
        let mut cookie = format!(
            "{}={value}; Path={}; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}",
            self.name, self.path
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        if let Some(d) = &self.domain {
            cookie.push_str(&format!("; Domain={d}"));
        }
        cookie
    }

    /// Find this cookie's value in a raw `Cookie` header.
    fn extract<'a>(&self, cookie_header: &'a str) -> Option<&'a str> {
        cookie_header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == self.name).then(|| value.trim()).filter(|v| !v.is_empty())
        })
    }
}

/// [`SessionStorage`] keeping session data in memory.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    cookie: CookieOptions,
    sessions: RwLock<HashMap<String, Entry>>,
}

#[derive(Debug)]
struct Entry {
    data: Map<String, Value>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

impl MemorySessionStorage {
    pub fn new(cookie: CookieOptions) -> Self {
        Self {
            cookie,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn cookie_options(&self) -> &CookieOptions {
        &self.cookie
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn lifetime(&self) -> Duration {
        Duration::from_secs(self.cookie.max_age_secs.max(0) as u64)
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn get_session(&self, cookie_header: Option<&str>) -> Result<Session, SessionError> {
        let Some(id) = cookie_header.and_then(|h| self.cookie.extract(h)) else {
            return Ok(Session::default());
        };

        let sessions = self.sessions.read().await;
        Ok(match sessions.get(id) {
            Some(entry) if entry.is_live(Instant::now()) => {
                Session::new(Some(id.to_string()), entry.data.clone())
            }
            // Unknown or expired id: start over rather than trusting the client.
            _ => Session::default(),
        })
    }

    async fn commit_session(&self, session: Session) -> Result<String, SessionError> {
        let (id, data) = session.into_parts();
        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = Instant::now();
        let entry = Entry {
            data,
            expires_at: now + self.lifetime(),
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, e| e.is_live(now));
        sessions.insert(id.clone(), entry);
        Ok(self.cookie.build(&id, self.cookie.max_age_secs))
    }

    async fn destroy_session(&self, session: Session) -> Result<String, SessionError> {
        if let Some(id) = session.id() {
            self.sessions.write().await.remove(id);
        }
        Ok(self.cookie.build("", 0))
    }
}
