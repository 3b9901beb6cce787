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

//! UserInfo endpoint helper.

use serde_json::Value;
use url::Url;

use crate::error::UpstreamError;

/// Fetch the raw userinfo payload for `access_token`.
pub async fn fetch_userinfo(
    http: &reqwest::Client,
    userinfo_url: &Url,
    access_token: &str,
) -> Result<Value, UpstreamError> {
    let resp = http
        .get(userinfo_url.clone())
        .bearer_auth(access_token)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status));
    }

    Ok(resp.json::<Value>().await?)
}
