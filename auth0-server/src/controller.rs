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

//! The credential lifecycle: authorize → callback → authenticated ⇄ refreshing.
//!
//! Every entry point either returns a value or an [`AuthRedirect`]. Failures
//! are logged here and turned into a redirect to the configured failure
//! destination; callers only ever propagate the redirect.

use std::sync::Arc;

use auth0_types::{
    AuthorizeOptions, ClientCredentials, HandleCallbackOptions, TokenType, UserCredentials,
    UserProfile,
};
use axum::body::Bytes;
use axum::http::{HeaderMap, Request};
use chrono::Utc;
use futures::FutureExt;

use crate::config::{Auth0Config, ConfigError};
use crate::context::RequestContext;
use crate::domain::Auth0Urls;
use crate::error::{AuthRedirect, UpstreamError};
use crate::oauth::{
    build_authorize_url, build_logout_url, exchange_token, fetch_openid_configuration,
    fetch_userinfo, parse_callback_form, JwksCache, KeyResolver, OpenIdConfiguration,
    TokenEndpointResponse, TokenError, TokenVerifier,
};
use crate::profile::to_user_profile;
use crate::session::{self, SessionStorage, SessionStore};

/// Hook receiving every freshly obtained credential set, refresh token
/// included regardless of the rotation setting.
pub type CredentialsCallback = Arc<dyn Fn(&UserCredentials) + Send + Sync>;

/// Auth0 integration for one application. Cheap to clone.
#[derive(Clone)]
pub struct Auth0 {
    inner: Arc<Inner>,
}

struct Inner {
    urls: Auth0Urls,
    client: ClientCredentials,
    callback_url: String,
    failed_login_redirect: String,
    refresh_token_rotation: bool,
    session: Option<SessionStore>,
    credentials_callback: Option<CredentialsCallback>,
    verifier: TokenVerifier,
    http: reqwest::Client,
}

/// Assembles an [`Auth0`] from its configuration and optional collaborators.
pub struct Auth0Builder {
    config: Auth0Config,
    session_storage: Option<Arc<dyn SessionStorage>>,
    credentials_callback: Option<CredentialsCallback>,
    key_resolver: Option<Arc<dyn KeyResolver>>,
    http: Option<reqwest::Client>,
}

impl Auth0Builder {
    /// Persist credentials in `storage` under the configured session key.
    /// Without storage, callbacks hand credentials back to the caller.
    pub fn session_storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.session_storage = Some(storage);
        self
    }

    pub fn credentials_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&UserCredentials) + Send + Sync + 'static,
    {
        self.credentials_callback = Some(Arc::new(callback));
        self
    }

    /// Replace the JWKS-backed key resolver, e.g. with pinned keys.
    pub fn key_resolver(mut self, resolver: Arc<dyn KeyResolver>) -> Self {
        self.key_resolver = Some(resolver);
        self
    }

    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<Auth0, ConfigError> {
        let Auth0Builder {
            config,
            session_storage,
            credentials_callback,
            key_resolver,
            http,
        } = self;

        let urls = Auth0Urls::new(&config.domain)
            .map_err(|e| ConfigError::Domain(format!("{}: {e}", config.domain)))?;
        let http = http.unwrap_or_default();
        let keys: Arc<dyn KeyResolver> = match key_resolver {
            Some(resolver) => resolver,
            None => JwksCache::new(urls.jwks_url.clone(), http.clone()),
        };
        let verifier = TokenVerifier::new(
            keys,
            urls.issuer(),
            config.client.audience.clone(),
            config.client.client_id.clone(),
        );
        let session = session_storage.map(|s| SessionStore::new(s, config.session_key.clone()));

        Ok(Auth0 {
            inner: Arc::new(Inner {
                urls,
                client: config.client,
                callback_url: config.callback_url,
                failed_login_redirect: config.failed_login_redirect,
                refresh_token_rotation: config.refresh_token_rotation,
                session,
                credentials_callback,
                verifier,
                http,
            }),
        })
    }
}

impl Auth0 {
    pub fn builder(config: Auth0Config) -> Auth0Builder {
        Auth0Builder {
            config,
            session_storage: None,
            credentials_callback: None,
            key_resolver: None,
            http: None,
        }
    }

    pub fn urls(&self) -> &Auth0Urls {
        &self.inner.urls
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.inner.verifier
    }

    pub fn session_store(&self) -> Option<&SessionStore> {
        self.inner.session.as_ref()
    }

    /// Redirect to Auth0's login page.
    pub fn authorize(&self, options: AuthorizeOptions) -> AuthRedirect {
        let url = build_authorize_url(
            &self.inner.urls.authorization_url,
            &self.inner.client,
            &self.inner.callback_url,
            options,
        );
        AuthRedirect::to(url.to_string())
    }

    /// Exchange the authorization code posted by Auth0 for credentials.
    ///
    /// With `on_success_redirect` set, the credentials are stored in the
    /// session and the result is a redirect carrying the session cookie;
    /// otherwise they are returned.
    pub async fn handle_callback(
        &self,
        request: &Request<Bytes>,
        options: HandleCallbackOptions,
    ) -> Result<UserCredentials, AuthRedirect> {
        let form = parse_callback_form(request.body());
        let Some(code) = form.code.filter(|c| !c.is_empty()) else {
            tracing::error!("No authorization code found in callback");
            return Err(self.failure());
        };

        let inner = &self.inner;
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", inner.client.client_id.as_str()),
            ("client_secret", inner.client.client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", inner.callback_url.as_str()),
        ];

        let tokens = exchange_token(&inner.http, &inner.urls.token_url, &params)
            .await
            .map_err(|e| self.upstream_failure("Failed to exchange authorization code", e))?;

        let credentials = self.credentials_from(tokens);

        match options.on_success_redirect {
            Some(target) => {
                let headers = self.persist(request.headers(), &credentials).await?;
                tracing::info!("Login successful, redirecting to {target}");
                Err(AuthRedirect::to(target).with_headers(headers))
            }
            None => Ok(credentials),
        }
    }

    /// Resolve the signed-in user's profile.
    ///
    /// An expired access token triggers a refresh. The caller that starts it
    /// persists the new credentials and is redirected back to the current
    /// request URL so the browser picks up the new session cookie; callers that
    /// joined an in-flight refresh in the same `context` retry with the
    /// refreshed credentials.
    pub async fn get_user<B>(
        &self,
        request: &Request<B>,
        context: &RequestContext,
    ) -> Result<UserProfile, AuthRedirect> {
        let Some(credentials) = self.load(request.headers()).await? else {
            tracing::error!("No credentials found in session");
            return Err(self.failure());
        };

        match self
            .inner
            .verifier
            .decode(&credentials.access_token, TokenType::Access)
            .await
        {
            Ok(_) => self.user_profile(&credentials.access_token).await,
            Err(TokenError::Expired) => self.refresh_and_resume(request, context, credentials).await,
            Err(e) => {
                tracing::error!("Failed to verify access token: {e}");
                Err(self.failure())
            }
        }
    }

    async fn refresh_and_resume<B>(
        &self,
        request: &Request<B>,
        context: &RequestContext,
        credentials: UserCredentials,
    ) -> Result<UserProfile, AuthRedirect> {
        let (flight, started) = context.join_or_start(|| {
            let this = self.clone();
            async move { this.refresh_credentials(credentials).await }.boxed()
        });

        let refreshed = flight.await?;

        if started {
            let headers = self.persist(request.headers(), &refreshed).await?;
            tracing::debug!("Access token refreshed; reloading {}", request.uri());
            return Err(AuthRedirect::to(request.uri().to_string()).with_headers(headers));
        }

        if let Err(e) = self
            .inner
            .verifier
            .decode(&refreshed.access_token, TokenType::Access)
            .await
        {
            tracing::error!("Refreshed access token failed verification: {e}");
            return Err(self.failure());
        }
        self.user_profile(&refreshed.access_token).await
    }

    /// Exchange the stored refresh token for new credentials. Does not persist.
    async fn refresh_credentials(
        &self,
        credentials: UserCredentials,
    ) -> Result<UserCredentials, AuthRedirect> {
        let Some(refresh_token) = credentials.refresh_token.as_deref() else {
            tracing::error!(
                "Access token expired and no refresh token is stored; \
                 enable refresh token rotation to refresh sessions"
            );
            return Err(self.failure());
        };

        let inner = &self.inner;
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", inner.client.client_id.as_str()),
            ("client_secret", inner.client.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];

        let mut tokens = exchange_token(&inner.http, &inner.urls.token_url, &params)
            .await
            .map_err(|e| self.upstream_failure("Failed to refresh credentials", e))?;

        // Without rotation on the tenant side, the old refresh token stays valid.
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token.to_string());
        }

        Ok(self.credentials_from(tokens))
    }

    /// Redirect to Auth0's logout endpoint, which returns the browser to
    /// `redirect_to`. `headers` (e.g. a cleared session cookie) ride along.
    pub fn logout(&self, redirect_to: &str, headers: HeaderMap) -> AuthRedirect {
        let url = build_logout_url(
            &self.inner.urls.logout_url,
            &self.inner.client.client_id,
            redirect_to,
        );
        AuthRedirect::to(url.to_string()).with_headers(headers)
    }

    /// Store `credentials` in the configured session. See
    /// [`session::save_user_to_session`].
    pub async fn save_user_to_session(
        &self,
        request_headers: &HeaderMap,
        credentials: &UserCredentials,
    ) -> Result<HeaderMap, AuthRedirect> {
        self.persist(request_headers, credentials).await
    }

    /// Credentials stored in the configured session, if any.
    pub async fn get_credentials(
        &self,
        request_headers: &HeaderMap,
    ) -> Result<Option<UserCredentials>, AuthRedirect> {
        self.load(request_headers).await
    }

    /// Clear the configured session, returning the headers that expire it.
    pub async fn clear_session(&self, request_headers: &HeaderMap) -> Result<HeaderMap, AuthRedirect> {
        session::destroy_session(request_headers, self.inner.session.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Failed to clear session: {e}");
                self.failure()
            })
    }

    /// Fetch the tenant's OIDC discovery document.
    pub async fn openid_configuration(&self) -> Result<OpenIdConfiguration, UpstreamError> {
        fetch_openid_configuration(&self.inner.http, &self.inner.urls.openid_configuration_url)
            .await
    }

    async fn user_profile(&self, access_token: &str) -> Result<UserProfile, AuthRedirect> {
        let raw = fetch_userinfo(&self.inner.http, &self.inner.urls.user_profile_url, access_token)
            .await
            .map_err(|e| self.upstream_failure("Failed to fetch user profile", e))?;

        to_user_profile(&raw).map_err(|e| {
            tracing::error!("Userinfo response is not a valid profile: {e}");
            self.failure()
        })
    }

    /// Stamp a token response with the current time and report it to the
    /// credentials callback. The refresh token is only kept with rotation on.
    fn credentials_from(&self, tokens: TokenEndpointResponse) -> UserCredentials {
        let mut credentials = UserCredentials::issued_at(
            tokens.access_token,
            tokens.refresh_token,
            tokens.expires_in,
            Utc::now().timestamp_millis(),
        );

        if let Some(callback) = &self.inner.credentials_callback {
            callback(&credentials);
        }
        if !self.inner.refresh_token_rotation {
            credentials.refresh_token = None;
        }
        credentials
    }

    async fn persist(
        &self,
        request_headers: &HeaderMap,
        credentials: &UserCredentials,
    ) -> Result<HeaderMap, AuthRedirect> {
        session::save_user_to_session(request_headers, credentials, self.inner.session.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Failed to save credentials to session: {e}");
                self.failure()
            })
    }

    async fn load(&self, request_headers: &HeaderMap) -> Result<Option<UserCredentials>, AuthRedirect> {
        session::get_credentials(request_headers, self.inner.session.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Failed to read session: {e}");
                self.failure()
            })
    }

    fn upstream_failure(&self, what: &str, err: UpstreamError) -> AuthRedirect {
        tracing::error!("{what}: {err}");
        self.failure()
    }

    fn failure(&self) -> AuthRedirect {
        AuthRedirect::to(self.inner.failed_login_redirect.clone())
    }
}
