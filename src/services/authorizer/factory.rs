/// Factory: build the `Authorizer` from application `Config`.
use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::services::authorizer::{Authorizer, JwtVerifier, RemoteJwks, RemoteJwksPolicy};

pub fn build_authorizer(config: &Config) -> Result<Arc<Authorizer>, ConfigError> {
    let trust = config.trust_parameters()?;

    let policy = RemoteJwksPolicy {
        cache_max_age: config.jwks_cache_max_age,
        cooldown: config.jwks_cooldown,
        timeout: config.jwks_timeout,
    };
    let keys = RemoteJwks::new(trust.key_source_url.clone(), policy).map_err(|err| {
        tracing::error!(error = %err, "failed to build jwks http client");
        ConfigError::Invalid("JWKS_TIMEOUT_MS")
    })?;

    tracing::info!(
        issuer = %trust.expected_issuer,
        jwks_url = %trust.key_source_url,
        "authorizer configured"
    );

    let verifier = JwtVerifier::new(Arc::new(keys));
    Ok(Arc::new(Authorizer::new(trust, Arc::new(verifier))))
}
