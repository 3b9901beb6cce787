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

//! Auth0 protocol helpers: authorize/logout URLs, token exchange, JWKS key
//! resolution, JWT verification, userinfo and OIDC discovery.

pub mod discovery;
pub mod exchange;
pub mod jwks;
pub mod userinfo;
pub mod verify;

pub use discovery::{fetch_openid_configuration, OpenIdConfiguration};
pub use exchange::{
    build_authorize_url, build_logout_url, exchange_token, parse_callback_form,
    TokenEndpointResponse, SCOPES,
};
pub use jwks::{JwksCache, KeyResolver, StaticKeySet};
pub use userinfo::fetch_userinfo;
pub use verify::{TokenError, TokenVerifier};
