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

//! Shared types for the Auth0 server-session helper.
//!
//! This crate defines the values that cross the boundary between the
//! `auth0-server` library and the applications embedding it: the static client
//! credentials, the per-user credentials persisted in the session, the
//! normalized user profile, and the options accepted by the entry points.
//! It does not depend on axum or any HTTP client.

pub mod credentials;
pub mod profile;
pub mod requests;

pub use credentials::{ClientCredentials, TokenType, UserCredentials};
pub use profile::UserProfile;
pub use requests::{AuthorizeOptions, CallbackForm, HandleCallbackOptions};
