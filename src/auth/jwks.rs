// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Behaviour
//!
//! - Keys are cached with a configurable TTL; a zero TTL fetches on every call
//! - On a miss, concurrent callers wait on a single refresh instead of each
//!   issuing their own request
//! - A token signed with a key missing from the cached set triggers one early
//!   refresh, at most once per [`DEFAULT_MIN_REFRESH_INTERVAL`]
//! - Fetches are bounded by the HTTP client timeout
//! - A fetch cancelled midway releases the refresh lock and stores nothing
//! - Any fetch failure leaves the cache untouched and surfaces as
//!   [`AuthError::KeySetUnavailable`]

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::JwkSet;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Minimum age of the cached set before an unknown `kid` may refetch it.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Upper bound for a single key-set request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable snapshot of the published key set.
pub type KeySet = Arc<JwkSet>;

/// JWKS cache entry.
struct CacheEntry {
    jwks: KeySet,
    fetched_at: Instant,
}

/// JWKS manager with caching.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct JwksManager {
    /// JWKS URL (identity provider endpoint)
    jwks_url: String,
    /// Cache TTL
    cache_ttl: Duration,
    /// Rate limit for refreshes forced by unknown key ids
    min_refresh_interval: Duration,
    /// Cached JWKS
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// Held while a fetch is in flight
    refresh_lock: Arc<Mutex<()>>,
    /// HTTP client
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint URL (e.g., `https://your-tenant.us.auth0.com/.well-known/jwks.json`)
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("coffee-shop-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            cache: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
            client,
        })
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Create with custom rate limit for unknown-key refreshes.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Current key set, fetched if the cache is empty or stale.
    pub async fn key_set(&self) -> Result<KeySet, AuthError> {
        if let Some(jwks) = self.cached().await {
            return Ok(jwks);
        }

        let _refreshing = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited
        if let Some(jwks) = self.cached().await {
            debug!("Reusing key set fetched by concurrent request");
            return Ok(jwks);
        }

        let jwks = Arc::new(self.fetch_jwks().await?);
        self.store(jwks.clone()).await;
        Ok(jwks)
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let _refreshing = self.refresh_lock.lock().await;
        let jwks = self.fetch_jwks().await?;
        self.store(Arc::new(jwks)).await;
        Ok(())
    }

    /// Refetch after `seen` turned out to lack a token's key.
    ///
    /// Returns `None` when `seen` is still the cached set and is younger than
    /// the minimum refresh interval. If a concurrent caller already replaced
    /// `seen`, its set is returned without another fetch.
    pub async fn refresh_unknown_key(&self, seen: &KeySet) -> Result<Option<KeySet>, AuthError> {
        let _refreshing = self.refresh_lock.lock().await;

        if let Some(entry) = self.cache.read().await.as_ref() {
            if !Arc::ptr_eq(&entry.jwks, seen) {
                return Ok(Some(entry.jwks.clone()));
            }
            if entry.fetched_at.elapsed() < self.min_refresh_interval {
                return Ok(None);
            }
        }

        debug!("Unknown key id, refreshing key set early");
        let jwks = Arc::new(self.fetch_jwks().await?);
        self.store(jwks.clone()).await;
        Ok(Some(jwks))
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        self.cached().await.is_some()
    }

    async fn cached(&self) -> Option<KeySet> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.jwks.clone())
    }

    async fn store(&self, jwks: KeySet) {
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks,
            fetched_at: Instant::now(),
        });
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        debug!(url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| unavailable(&self.jwks_url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(
                &self.jwks_url,
                format!("HTTP {} from JWKS endpoint", response.status()),
            ));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| unavailable(&self.jwks_url, e.to_string()))?;

        debug!(keys = jwks.keys.len(), "Fetched JWKS");
        Ok(jwks)
    }
}

fn unavailable(url: &str, reason: String) -> AuthError {
    warn!(url, %reason, "JWKS fetch failed");
    AuthError::KeySetUnavailable(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, KeyServer, TEST_KID};

    #[test]
    fn jwks_manager_creation() {
        let manager = JwksManager::new("https://coffee.example/.well-known/jwks.json").unwrap();
        assert_eq!(
            manager.jwks_url(),
            "https://coffee.example/.well-known/jwks.json"
        );
        assert_eq!(manager.cache_ttl, DEFAULT_CACHE_TTL);
    }

    #[test]
    fn custom_cache_ttl() {
        let manager = JwksManager::new("https://coffee.example/.well-known/jwks.json")
            .unwrap()
            .with_cache_ttl(Duration::from_secs(60));
        assert_eq!(manager.cache_ttl, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn cache_initially_empty() {
        let manager = JwksManager::new("https://coffee.example/.well-known/jwks.json").unwrap();
        assert!(!manager.is_cached().await);
    }

    #[tokio::test]
    async fn fetches_and_parses_key_set() {
        let server = KeyServer::spawn(test_support::key_set()).await;
        let manager = JwksManager::new(server.jwks_url()).unwrap();

        let jwks = manager.key_set().await.unwrap();
        assert_eq!(jwks.keys.len(), 1);
        assert_eq!(jwks.keys[0].common.key_id.as_deref(), Some(TEST_KID));
        assert!(manager.is_cached().await);
    }

    #[tokio::test]
    async fn fresh_cache_is_reused() {
        let server = KeyServer::spawn(test_support::key_set()).await;
        let manager = JwksManager::new(server.jwks_url()).unwrap();

        manager.key_set().await.unwrap();
        manager.key_set().await.unwrap();
        manager.key_set().await.unwrap();
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn zero_ttl_fetches_every_time() {
        let server = KeyServer::spawn(test_support::key_set()).await;
        let manager = JwksManager::new(server.jwks_url())
            .unwrap()
            .with_cache_ttl(Duration::ZERO);

        manager.key_set().await.unwrap();
        manager.key_set().await.unwrap();
        assert_eq!(server.hits(), 2);
        assert!(!manager.is_cached().await);
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let server =
            KeyServer::spawn_with_delay(test_support::key_set(), Duration::from_millis(100)).await;
        let manager = JwksManager::new(server.jwks_url()).unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.key_set().await })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn cancelled_fetch_releases_lock_and_caches_nothing() {
        let server =
            KeyServer::spawn_with_delay(test_support::key_set(), Duration::from_millis(500)).await;
        let manager = JwksManager::new(server.jwks_url()).unwrap();

        let pending = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.key_set().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert!(!manager.is_cached().await);

        let jwks = tokio::time::timeout(Duration::from_secs(5), manager.key_set())
            .await
            .expect("refresh lock released")
            .unwrap();
        assert_eq!(jwks.keys.len(), 1);
        assert!(manager.is_cached().await);
    }

    #[tokio::test]
    async fn unknown_key_refresh_reuses_newer_set() {
        let server = KeyServer::spawn(test_support::key_set()).await;
        let manager = JwksManager::new(server.jwks_url())
            .unwrap()
            .with_min_refresh_interval(Duration::ZERO);

        let stale = manager.key_set().await.unwrap();
        let fresh = manager.refresh_unknown_key(&stale).await.unwrap().unwrap();
        assert!(!Arc::ptr_eq(&stale, &fresh));
        assert_eq!(server.hits(), 2);

        // A caller still holding the old set gets the replacement without a fetch
        let reused = manager.refresh_unknown_key(&stale).await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&fresh, &reused));
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn unknown_key_refresh_skips_young_set() {
        let server = KeyServer::spawn(test_support::key_set()).await;
        let manager = JwksManager::new(server.jwks_url()).unwrap();

        let current = manager.key_set().await.unwrap();
        assert!(manager.refresh_unknown_key(&current).await.unwrap().is_none());
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn refresh_replaces_cached_set() {
        let server = KeyServer::spawn(test_support::key_set()).await;
        let manager = JwksManager::new(server.jwks_url()).unwrap();

        manager.key_set().await.unwrap();
        manager.refresh().await.unwrap();
        assert_eq!(server.hits(), 2);
        assert!(manager.is_cached().await);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        let manager = JwksManager::new(test_support::UNREACHABLE_JWKS_URL).unwrap();
        let result = manager.key_set().await;
        assert!(matches!(result, Err(AuthError::KeySetUnavailable(_))));
        assert!(!manager.is_cached().await);
    }

    #[tokio::test]
    async fn error_status_is_unavailable() {
        let server = KeyServer::spawn_failing().await;
        let manager = JwksManager::new(server.jwks_url()).unwrap();

        let result = manager.key_set().await;
        assert!(
            matches!(result, Err(AuthError::KeySetUnavailable(reason)) if reason.contains("500"))
        );
    }

    #[tokio::test]
    async fn unparsable_body_is_unavailable() {
        let server = KeyServer::spawn(serde_json::json!({ "not_keys": true })).await;
        let manager = JwksManager::new(server.jwks_url()).unwrap();

        let result = manager.key_set().await;
        assert!(matches!(result, Err(AuthError::KeySetUnavailable(_))));
    }
}
