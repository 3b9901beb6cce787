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

//! Userinfo payload → [`UserProfile`].

use auth0_types::UserProfile;
use serde_json::Value;

use crate::camelize::{camelize_json_keys, Depth};

/// Camelize every key of a raw userinfo payload and read it as a profile.
pub fn to_user_profile(raw: &Value) -> Result<UserProfile, serde_json::Error> {
    serde_json::from_value(camelize_json_keys(raw, Depth::Deep))
}
