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

//! Shared application state passed to every Axum handler via `State`.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::controller::Auth0;
use crate::session::{CookieOptions, MemorySessionStorage};
use crate::ConfigError;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth0: Auth0,
    /// Where the browser lands after login and logout.
    pub after_login_url: String,
}

impl AppState {
    pub fn new(auth0: Auth0, after_login_url: impl Into<String>) -> Self {
        Self {
            auth0,
            after_login_url: after_login_url.into(),
        }
    }

    /// Build the state from configuration with an in-memory session backend.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let storage = MemorySessionStorage::new(CookieOptions {
            name: config.session_cookie_name.clone(),
            secure: config.cookie_secure,
            ..CookieOptions::default()
        });

        let auth0 = Auth0::builder(config.auth0.clone())
            .session_storage(Arc::new(storage))
            .build()?;

        Ok(Self::new(auth0, config.after_login_url.clone()))
    }
}
