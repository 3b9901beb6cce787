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

//! Auth0 integration for server-rendered web applications.
//!
//! [`Auth0`] drives the authorization-code flow, verifies access tokens
//! against the tenant's JWKS, refreshes expired tokens once per request, and
//! keeps the user's credentials in a server-side session. Failures surface as
//! [`AuthRedirect`] values that the web framework turns into `302` responses.
//!
//! The binary (`main.rs`) wires this library into a small Axum application.

pub mod camelize;
pub mod config;
pub mod context;
pub mod controller;
pub mod domain;
pub mod error;
pub mod oauth;
pub mod profile;
pub mod routes;
pub mod session;
pub mod state;

pub use auth0_types;
pub use config::{Auth0Config, ConfigError, ServerConfig};
pub use context::RequestContext;
pub use controller::{Auth0, Auth0Builder, CredentialsCallback};
pub use domain::{ensure_domain, Auth0Urls};
pub use error::{AuthRedirect, UpstreamError};
pub use session::{SessionError, SessionStorage, SessionStore};
