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

//! Demo server entry point.
//!
//! A small Axum application exposing `/login`, `/signup`, `/callback`,
//! `/profile` and `/logout` on top of the library, with sessions kept in
//! memory.

use auth0_server::config::ServerConfig;
use auth0_server::routes;
use auth0_server::state::AppState;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env().expect("failed to load configuration");
    let state = AppState::from_config(&config).expect("invalid Auth0 configuration");

    tracing::info!(
        "Using Auth0 tenant {} (refresh token rotation: {})",
        state.auth0.urls().domain(),
        config.auth0.refresh_token_rotation
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router().layer(cors).with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind listener");

    tracing::info!("Auth0 demo listening on {}", config.listen_addr);

    axum::serve(listener, app).await.expect("server error");
}
