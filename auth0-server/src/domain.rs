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

//! Domain normalization and the Auth0 endpoint URLs derived from it.

use url::Url;

/// Prefix `https://` unless `domain` already carries an `http://` or
/// `https://` scheme.
pub fn ensure_domain(domain: &str) -> String {
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

/// Endpoint URLs of one Auth0 tenant, computed once at construction.
#[derive(Debug, Clone)]
pub struct Auth0Urls {
    domain: String,
    pub authorization_url: Url,
    pub token_url: Url,
    pub user_profile_url: Url,
    pub openid_configuration_url: Url,
    pub jwks_url: Url,
    pub logout_url: Url,
}

impl Auth0Urls {
    pub fn new(domain: &str) -> Result<Self, url::ParseError> {
        let domain = ensure_domain(domain).trim_end_matches('/').to_string();
        let base = Url::parse(&domain)?;

        Ok(Self {
            authorization_url: base.join("/authorize")?,
            token_url: base.join("/oauth/token")?,
            user_profile_url: base.join("/userinfo")?,
            openid_configuration_url: base.join("/.well-known/openid-configuration")?,
            jwks_url: base.join("/.well-known/jwks.json")?,
            logout_url: base.join("/v2/logout")?,
            domain,
        })
    }

    /// The normalized domain, scheme included and without a trailing slash.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Expected `iss` claim of tokens minted by this tenant.
    pub fn issuer(&self) -> String {
        format!("{}/", self.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_gets_https() {
        assert_eq!(ensure_domain("tenant.auth0.com"), "https://tenant.auth0.com");
    }

    #[test]
    fn existing_scheme_is_kept() {
        assert_eq!(ensure_domain("http://localhost:3000"), "http://localhost:3000");
        assert_eq!(ensure_domain("https://tenant.auth0.com"), "https://tenant.auth0.com");
    }

    #[test]
    fn urls_are_derived_from_domain() {
        let urls = Auth0Urls::new("tenant.eu.auth0.com").unwrap();
        assert_eq!(urls.authorization_url.as_str(), "https://tenant.eu.auth0.com/authorize");
        assert_eq!(urls.token_url.as_str(), "https://tenant.eu.auth0.com/oauth/token");
        assert_eq!(urls.user_profile_url.as_str(), "https://tenant.eu.auth0.com/userinfo");
        assert_eq!(
            urls.openid_configuration_url.as_str(),
            "https://tenant.eu.auth0.com/.well-known/openid-configuration"
        );
        assert_eq!(
            urls.jwks_url.as_str(),
            "https://tenant.eu.auth0.com/.well-known/jwks.json"
        );
        assert_eq!(urls.logout_url.as_str(), "https://tenant.eu.auth0.com/v2/logout");
        assert_eq!(urls.issuer(), "https://tenant.eu.auth0.com/");
    }

    #[test]
    fn trailing_slash_does_not_double_issuer_slash() {
        let urls = Auth0Urls::new("https://tenant.auth0.com/").unwrap();
        assert_eq!(urls.issuer(), "https://tenant.auth0.com/");
    }
}
