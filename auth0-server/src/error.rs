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

//! Redirect signal and upstream error types.
//!
//! Every failure in the request-handling flows is expressed as an
//! [`AuthRedirect`]: the entry points return `Result<T, AuthRedirect>`, callers
//! propagate it with `?`, and only the framework boundary turns it into an
//! HTTP `302 Found` via [`IntoResponse`].

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// A redirect that unwinds the current flow up to the response layer.
#[derive(Debug, Clone)]
pub struct AuthRedirect {
    location: String,
    headers: HeaderMap,
}

impl AuthRedirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Merge `headers` into the redirect. Repeated names (e.g. several
    /// `Set-Cookie` values) are appended, never replaced.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        let mut current: Option<HeaderName> = None;
        for (name, value) in headers {
            if let Some(name) = name {
                current = Some(name);
            }
            if let Some(name) = &current {
                self.headers.append(name.clone(), value);
            }
        }
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `Set-Cookie` values carried by this redirect.
    pub fn set_cookies(&self) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }
}

impl std::fmt::Display for AuthRedirect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "redirect to {}", self.location)
    }
}

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        let location = match HeaderValue::from_str(&self.location) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("Invalid redirect location {:?}: {e}", self.location);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let mut response = StatusCode::FOUND.into_response();
        *response.headers_mut() = self.headers;
        response.headers_mut().insert(header::LOCATION, location);
        response
    }
}

/// Failure talking to one of Auth0's HTTP endpoints.
///
/// Response bodies are never captured; only the status survives.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),
}
