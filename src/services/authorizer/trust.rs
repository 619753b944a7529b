//! Trust parameters: who we accept tokens from and how they must be signed.
//!
//! Built once at startup and shared read-only by every evaluation.

use jsonwebtoken::Algorithm;
use url::Url;

use crate::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustParameters {
    pub expected_issuer: String,
    pub allowed_algorithms: Vec<Algorithm>,
    pub key_source_url: Url,
    // Clock skew tolerance for exp/nbf, seconds.
    pub leeway_seconds: u64,
}

impl TrustParameters {
    /// Derive issuer and JWKS URL for a Cognito user pool.
    pub fn for_user_pool(
        region: &str,
        user_pool_id: &str,
        leeway_seconds: u64,
    ) -> Result<Self, ConfigError> {
        if !is_path_safe(region) {
            return Err(ConfigError::Invalid("AWS_REGION"));
        }
        if !is_path_safe(user_pool_id) {
            return Err(ConfigError::Invalid("COGNITO_USER_POOL_ID"));
        }

        let expected_issuer = format!("https://cognito-idp.{region}.amazonaws.com/{user_pool_id}");
        let key_source_url = Url::parse(&format!("{expected_issuer}/.well-known/jwks.json"))
            .map_err(|_| ConfigError::Invalid("COGNITO_USER_POOL_ID"))?;

        Ok(Self {
            expected_issuer,
            allowed_algorithms: vec![Algorithm::RS256],
            key_source_url,
            leeway_seconds,
        })
    }

    pub fn allows(&self, alg: Algorithm) -> bool {
        self.allowed_algorithms.contains(&alg)
    }
}

fn is_path_safe(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
