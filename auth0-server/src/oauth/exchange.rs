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

//! Authorize/logout URL construction and token-endpoint exchanges.

use auth0_types::{AuthorizeOptions, CallbackForm, ClientCredentials};
use serde::Deserialize;
use url::Url;

use crate::error::UpstreamError;

/// Scopes requested on every authorization. `offline_access` yields the
/// refresh token used for rotation.
pub const SCOPES: &str = "offline_access openid profile email";

/// Raw response from `POST /oauth/token`.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenEndpointResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Build the `/authorize` URL for an authorization-code flow answered by
/// `form_post`.
pub fn build_authorize_url(
    authorization_url: &Url,
    client: &ClientCredentials,
    redirect_uri: &str,
    options: AuthorizeOptions,
) -> Url {
    let mut url = authorization_url.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("response_type", "code");
        pairs.append_pair("response_mode", "form_post");
        pairs.append_pair("client_id", &client.client_id);
        pairs.append_pair("redirect_uri", redirect_uri);
        pairs.append_pair("scope", SCOPES);
        pairs.append_pair("audience", &client.audience);

        if let Some(org) = &client.organization {
            pairs.append_pair("organization", org);
        }
        if options.force_login {
            pairs.append_pair("prompt", "login");
        }
        if options.force_signup {
            pairs.append_pair("screen_hint", "signup");
        }
    }
    url
}

/// Build the `/v2/logout` URL that sends the browser back to `return_to`.
pub fn build_logout_url(logout_url: &Url, client_id: &str, return_to: &str) -> Url {
    let mut url = logout_url.clone();
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("returnTo", return_to);
    url
}

/// Read the `application/x-www-form-urlencoded` body Auth0 posts to the callback.
pub fn parse_callback_form(body: &[u8]) -> CallbackForm {
    let mut form = CallbackForm::default();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "code" => form.code = Some(value.into_owned()),
            "state" => form.state = Some(value.into_owned()),
            _ => {}
        }
    }
    form
}

/// POST `params` to the token endpoint as a form and parse the token response.
pub async fn exchange_token(
    http: &reqwest::Client,
    token_url: &Url,
    params: &[(&str, &str)],
) -> Result<TokenEndpointResponse, UpstreamError> {
    let response = http.post(token_url.clone()).form(params).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status));
    }

    Ok(response.json::<TokenEndpointResponse>().await?)
}
