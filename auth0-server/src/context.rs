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

//! Per-request context carrying the in-flight refresh.

use std::sync::Mutex;

use auth0_types::UserCredentials;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::AuthRedirect;

pub(crate) type RefreshOutcome = Result<UserCredentials, AuthRedirect>;
pub(crate) type RefreshFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

/// State scoped to one inbound request.
///
/// Create one per request and pass it to every
/// [`get_user`](crate::Auth0::get_user) call made while handling that request.
/// The first caller that finds an expired access token stores its refresh here
/// before awaiting it; later callers with the same context await that refresh
/// instead of starting their own. Contexts are never shared across requests.
#[derive(Default)]
pub struct RequestContext {
    refresh: Mutex<Option<RefreshFlight>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a refresh has been started in this context.
    pub fn has_refresh(&self) -> bool {
        self.slot().is_some()
    }

    /// Return the refresh already stored in this context, or store the one
    /// produced by `start`. The flag is `true` when `start` was used.
    pub(crate) fn join_or_start<F>(&self, start: F) -> (RefreshFlight, bool)
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let mut slot = self.slot();
        if let Some(flight) = slot.as_ref() {
            return (flight.clone(), false);
        }
        let flight = start().shared();
        *slot = Some(flight.clone());
        (flight, true)
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<RefreshFlight>> {
        // A poisoned slot still holds a usable future handle.
        self.refresh.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("refresh_started", &self.has_refresh())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn second_caller_joins_the_first_refresh() {
        let ctx = RequestContext::new();
        let started = Arc::new(AtomicUsize::new(0));

        let start = |started: Arc<AtomicUsize>| {
            move || {
                started.fetch_add(1, Ordering::SeqCst);
                async { Ok(UserCredentials::issued_at("new".into(), None, 60, 0)) }.boxed()
            }
        };

        let (first, leader) = ctx.join_or_start(start(started.clone()));
        let (second, follower_leads) = ctx.join_or_start(start(started.clone()));

        assert!(leader);
        assert!(!follower_leads);
        assert!(ctx.has_refresh());

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a.unwrap().access_token, "new");
        assert_eq!(b.unwrap().access_token, "new");
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fresh_context_has_no_refresh() {
        assert!(!RequestContext::new().has_refresh());
    }
}
