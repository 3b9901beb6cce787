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

//! Login, callback, profile and logout handlers.
//!
//! These are the framework boundary: every [`AuthRedirect`] produced by the
//! library ends up here and becomes a `302 Found`.

use auth0_types::{AuthorizeOptions, HandleCallbackOptions, UserProfile};
use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{self, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::context::RequestContext;
use crate::error::AuthRedirect;
use crate::state::AppState;

/// Largest callback body accepted; Auth0 posts a code and a state.
const MAX_CALLBACK_BODY: usize = 16 * 1024;

/// GET /login
pub async fn login(State(state): State<AppState>) -> AuthRedirect {
    state.auth0.authorize(AuthorizeOptions::default())
}

/// GET /signup
pub async fn signup(State(state): State<AppState>) -> AuthRedirect {
    state.auth0.authorize(AuthorizeOptions {
        force_signup: true,
        ..AuthorizeOptions::default()
    })
}

/// POST /callback
///
/// Auth0 posts the authorization code here (`response_mode=form_post`).
pub async fn callback(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_CALLBACK_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Rejecting callback body: {e}");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };
    let request = http::Request::from_parts(parts, body);

    let options = HandleCallbackOptions {
        on_success_redirect: Some(state.after_login_url.clone()),
    };
    match state.auth0.handle_callback(&request, options).await {
        // Only reachable without a success redirect.
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(redirect) => redirect.into_response(),
    }
}

/// GET /profile -- the signed-in user's profile as JSON.
pub async fn profile(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<UserProfile>, AuthRedirect> {
    let (parts, _body) = request.into_parts();
    let request = http::Request::from_parts(parts, ());
    let context = RequestContext::new();

    let profile = state.auth0.get_user(&request, &context).await?;
    Ok(Json(profile))
}

/// GET /logout -- clears the session and signs out of Auth0.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AuthRedirect {
    let headers = match state.auth0.clear_session(&headers).await {
        Ok(headers) => headers,
        Err(redirect) => return redirect,
    };
    state.auth0.logout(&state.after_login_url, headers)
}
