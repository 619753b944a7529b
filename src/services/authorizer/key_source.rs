//! Key resolution: map a token's `kid` to verification key material.
//!
//! The verifier only sees the `KeyResolver` trait. Caching and refresh of
//! remote key sets live here, not in the decision pipeline.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::RwLock;
use tokio::time::Instant;
use url::Url;

use super::error::KeyError;

#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, kid: Option<&str>) -> Result<DecodingKey, KeyError>;
}

/// Pick the JWK for `kid`.
///
/// Without a `kid` the set must hold exactly one key.
pub fn select_key<'a>(set: &'a JwkSet, kid: Option<&str>) -> Result<&'a Jwk, KeyError> {
    match kid {
        Some(kid) => set
            .find(kid)
            .ok_or_else(|| KeyError::UnknownKey(Some(kid.to_string()))),
        None => match set.keys.as_slice() {
            [only] => Ok(only),
            [] => Err(KeyError::UnknownKey(None)),
            keys => Err(KeyError::AmbiguousKey(keys.len())),
        },
    }
}

fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, KeyError> {
    DecodingKey::from_jwk(jwk).map_err(KeyError::InvalidJwk)
}

/// Fixed, in-memory key set.
#[derive(Debug, Clone)]
pub struct StaticJwks {
    set: JwkSet,
}

impl StaticJwks {
    pub fn new(set: JwkSet) -> Self {
        Self { set }
    }
}

#[async_trait]
impl KeyResolver for StaticJwks {
    async fn resolve(&self, kid: Option<&str>) -> Result<DecodingKey, KeyError> {
        decoding_key(select_key(&self.set, kid)?)
    }
}

/// Cache / fetch knobs for `RemoteJwks`.
#[derive(Debug, Clone, Copy)]
pub struct RemoteJwksPolicy {
    // A fetched set is served without refetch for this long.
    pub cache_max_age: Duration,
    // Minimum interval between fetches triggered by an unknown kid.
    pub cooldown: Duration,
    // Per-request HTTP timeout.
    pub timeout: Duration,
}

impl Default for RemoteJwksPolicy {
    fn default() -> Self {
        Self {
            cache_max_age: Duration::from_secs(600),
            cooldown: Duration::from_secs(30),
            timeout: Duration::from_millis(5000),
        }
    }
}

struct CachedSet {
    set: JwkSet,
    fetched_at: Instant,
}

#[derive(Default)]
struct KeyCache {
    current: Option<CachedSet>,
    // Set before every fetch, successful or not.
    last_attempt: Option<Instant>,
}

/// JWKS fetched over HTTP and cached in memory.
///
/// Nothing is fetched until the first `resolve`. Fetches are serialized on
/// the cache lock and at most one is attempted per `cooldown`, whether it
/// succeeds or fails.
pub struct RemoteJwks {
    url: Url,
    client: reqwest::Client,
    policy: RemoteJwksPolicy,
    cache: RwLock<KeyCache>,
}

impl std::fmt::Debug for RemoteJwks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteJwks")
            .field("url", &self.url.as_str())
            .field("policy", &self.policy)
            .finish()
    }
}

impl RemoteJwks {
    pub fn new(url: Url, policy: RemoteJwksPolicy) -> Result<Self, KeyError> {
        let client = reqwest::Client::builder().timeout(policy.timeout).build()?;
        Ok(Self::with_client(url, policy, client))
    }

    pub fn with_client(url: Url, policy: RemoteJwksPolicy, client: reqwest::Client) -> Self {
        Self {
            url,
            client,
            policy,
            cache: RwLock::new(KeyCache::default()),
        }
    }

    async fn fetch(&self) -> Result<JwkSet, KeyError> {
        tracing::debug!(url = %self.url, "fetching jwks");

        let res = self.client.get(self.url.clone()).send().await?;
        if !res.status().is_success() {
            return Err(KeyError::Status(res.status()));
        }

        Ok(res.json::<JwkSet>().await?)
    }

    /// Fetch and replace the cached set, returning a key for `kid` from it.
    async fn refresh(&self, kid: Option<&str>) -> Result<DecodingKey, KeyError> {
        let mut guard = self.cache.write().await;

        // Another task attempted a fetch while we waited for the lock, or a
        // recent attempt failed: answer from what we have.
        if let Some(at) = guard.last_attempt
            && at.elapsed() < self.policy.cooldown
        {
            return match guard.current.as_ref() {
                Some(cached) => decoding_key(select_key(&cached.set, kid)?),
                None => Err(KeyError::Unavailable),
            };
        }

        guard.last_attempt = Some(Instant::now());

        let set = self.fetch().await.inspect_err(|err| {
            tracing::warn!(error = %err, url = %self.url, "jwks fetch failed");
        })?;

        let key = select_key(&set, kid).and_then(decoding_key);
        guard.current = Some(CachedSet {
            set,
            fetched_at: Instant::now(),
        });
        key
    }
}

#[async_trait]
impl KeyResolver for RemoteJwks {
    async fn resolve(&self, kid: Option<&str>) -> Result<DecodingKey, KeyError> {
        {
            let guard = self.cache.read().await;
            if let Some(cached) = guard.current.as_ref() {
                let age = cached.fetched_at.elapsed();
                match select_key(&cached.set, kid) {
                    Ok(jwk) if age < self.policy.cache_max_age => return decoding_key(jwk),
                    // Unknown kid: refetch only outside the cooldown window.
                    Err(err) if age < self.policy.cooldown => return Err(err),
                    _ => {}
                }
            }
        }

        self.refresh(kid).await
    }
}
