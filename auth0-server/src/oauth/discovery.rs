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

//! OIDC discovery: fetching `.well-known/openid-configuration`.

use serde::Deserialize;
use url::Url;

use crate::error::UpstreamError;

/// The parts of the tenant's discovery document this crate cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenIdConfiguration {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    pub jwks_uri: String,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
    #[serde(default)]
    pub scopes_supported: Vec<String>,
}

/// Fetch the discovery document from `url`.
pub async fn fetch_openid_configuration(
    http: &reqwest::Client,
    url: &Url,
) -> Result<OpenIdConfiguration, UpstreamError> {
    let resp = http.get(url.clone()).send().await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status));
    }

    Ok(resp.json::<OpenIdConfiguration>().await?)
}
