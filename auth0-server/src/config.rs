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

//! Configuration loaded from environment variables.

use std::env;

use auth0_types::ClientCredentials;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("invalid Auth0 domain: {0}")]
    Domain(String),
}

/// Settings of one Auth0 integration.
#[derive(Debug, Clone)]
pub struct Auth0Config {
    /// Tenant domain, with or without scheme (e.g. `"tenant.eu.auth0.com"`).
    pub domain: String,
    pub client: ClientCredentials,
    /// Where Auth0 posts the authorization code.
    pub callback_url: String,
    /// Destination of every failed flow.
    pub failed_login_redirect: String,
    /// Keep refresh tokens in the session and refresh expired access tokens.
    pub refresh_token_rotation: bool,
    /// Session key holding the user's credentials.
    pub session_key: String,
}

impl Auth0Config {
    pub const DEFAULT_SESSION_KEY: &'static str = "user";

    /// Load the integration settings from environment variables.
    ///
    /// # Required
    /// - `AUTH0_DOMAIN`, `AUTH0_CLIENT_ID`, `AUTH0_CLIENT_SECRET`,
    ///   `AUTH0_AUDIENCE`, `AUTH0_CALLBACK_URL`
    ///
    /// # Optional
    /// - `AUTH0_ORGANIZATION`
    /// - `AUTH0_FAILED_LOGIN_REDIRECT` (default: `"/"`)
    /// - `AUTH0_REFRESH_TOKEN_ROTATION` (default: `"false"`)
    /// - `AUTH0_SESSION_KEY` (default: `"user"`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            domain: required("AUTH0_DOMAIN")?,
            client: ClientCredentials {
                client_id: required("AUTH0_CLIENT_ID")?,
                client_secret: required("AUTH0_CLIENT_SECRET")?,
                audience: required("AUTH0_AUDIENCE")?,
                organization: optional("AUTH0_ORGANIZATION"),
            },
            callback_url: required("AUTH0_CALLBACK_URL")?,
            failed_login_redirect: optional("AUTH0_FAILED_LOGIN_REDIRECT")
                .unwrap_or_else(|| "/".to_string()),
            refresh_token_rotation: flag("AUTH0_REFRESH_TOKEN_ROTATION", false)?,
            session_key: optional("AUTH0_SESSION_KEY")
                .unwrap_or_else(|| Self::DEFAULT_SESSION_KEY.to_string()),
        })
    }
}

/// Settings of the demo HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP server (e.g. "0.0.0.0:3000").
    pub listen_addr: String,
    pub auth0: Auth0Config,
    pub session_cookie_name: String,
    pub cookie_secure: bool,
    /// Where the browser lands after login and after logout.
    pub after_login_url: String,
}

impl ServerConfig {
    /// Load the server settings, including [`Auth0Config::from_env`].
    ///
    /// # Optional
    /// - `LISTEN_ADDR` (default: `"0.0.0.0:3000"`)
    /// - `SESSION_COOKIE_NAME` (default: `"__session"`)
    /// - `COOKIE_SECURE` (default: `"true"`)
    /// - `AFTER_LOGIN_URL` (default: `"/profile"`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            listen_addr: optional("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            auth0: Auth0Config::from_env()?,
            session_cookie_name: optional("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| "__session".to_string()),
            cookie_secure: flag("COOKIE_SECURE", true)?,
            after_login_url: optional("AFTER_LOGIN_URL").unwrap_or_else(|| "/profile".to_string()),
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::Missing(var))
}

fn optional(var: &'static str) -> Option<String> {
    env::var(var).ok().filter(|s| !s.is_empty())
}

fn flag(var: &'static str, default: bool) -> Result<bool, ConfigError> {
    match optional(var) {
        None => Ok(default),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { var, value }),
        },
    }
}
