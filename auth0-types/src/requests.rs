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

//! Options accepted by the request-handling entry points.

use serde::{Deserialize, Serialize};

/// Options for building the authorize redirect.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeOptions {
    /// Adds `prompt=login`, forcing the login page even with an Auth0 session.
    #[serde(default)]
    pub force_login: bool,

    /// Adds `screen_hint=signup`, opening the signup page.
    #[serde(default)]
    pub force_signup: bool,
}

/// Options for the authorization callback.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleCallbackOptions {
    /// When set, credentials are persisted and the user is redirected here.
    /// When unset, credentials are returned to the caller instead.
    #[serde(default)]
    pub on_success_redirect: Option<String>,
}

/// Form body posted by Auth0 to the callback URL (`response_mode=form_post`).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CallbackForm {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub state: Option<String>,
}
