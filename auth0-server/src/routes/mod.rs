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

//! Axum router for the demo application.

pub mod auth;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Build the application router with the login/session routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/signup", get(auth::signup))
        .route("/callback", post(auth::callback))
        .route("/profile", get(auth::profile))
        .route("/logout", get(auth::logout))
}
