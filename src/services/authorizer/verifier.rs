use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::Validation;

use super::claims::ClaimSet;
use super::error::VerifyError;
use super::key_source::KeyResolver;
use super::trust::TrustParameters;

/// Cryptographic verification seam.
///
/// Implementations must return a claim set only when the signature, the
/// algorithm and the issuer all check out against `trust`.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str, trust: &TrustParameters) -> Result<ClaimSet, VerifyError>;
}

/// `jsonwebtoken`-backed verifier resolving keys through a `KeyResolver`.
#[derive(Clone)]
pub struct JwtVerifier {
    keys: Arc<dyn KeyResolver>,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

impl JwtVerifier {
    pub fn new(keys: Arc<dyn KeyResolver>) -> Self {
        Self { keys }
    }

    fn validation(trust: &TrustParameters, alg: jsonwebtoken::Algorithm) -> Validation {
        // Header alg is already checked against the allow list; pinning it keeps
        // the key family check in `decode` to a single algorithm.
        let mut validation = Validation::new(alg);
        validation.set_issuer(&[trust.expected_issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_nbf = true;
        // Access tokens carry client_id, not aud.
        validation.validate_aud = false;
        validation.leeway = trust.leeway_seconds;
        validation
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str, trust: &TrustParameters) -> Result<ClaimSet, VerifyError> {
        let header = jsonwebtoken::decode_header(token).map_err(VerifyError::Header)?;

        // Reject before touching the key source.
        if !trust.allows(header.alg) {
            return Err(VerifyError::AlgorithmNotAllowed(header.alg));
        }

        let key = self.keys.resolve(header.kid.as_deref()).await?;
        let data = jsonwebtoken::decode::<ClaimSet>(token, &key, &Self::validation(trust, header.alg))?;

        Ok(data.claims)
    }
}
