/*
 * Responsibility
 * - Authorization pipeline の error taxonomy
 * - 外部に出すのは "malformed request" / "unauthorized" の 2 種類だけ
 * - 内部原因 (Display) はログ専用。token 文字列は一切含めない
 */
use jsonwebtoken::Algorithm;
use thiserror::Error;

/// Message returned to the caller when no usable bearer token is present.
///
/// Caller-side systems pattern-match on this literal; do not change it.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "No bearer token!";

/// Message returned to the caller for every post-extraction failure.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

#[derive(Debug, Error)]
pub enum AuthorizationError {
    #[error("No bearer token!")]
    MissingCredential,

    #[error("token verification failed: {0}")]
    VerificationFailed(#[from] VerifyError),

    #[error("not an access token (token_use: {0:?})")]
    WrongTokenType(Option<String>),

    #[error("insufficient permissions: {0}")]
    InsufficientScope(#[from] ScopeError),
}

impl AuthorizationError {
    /// `true` only for the one kind the caller may distinguish.
    pub fn is_malformed_request(&self) -> bool {
        matches!(self, Self::MissingCredential)
    }

    /// The only text that may cross the boundary.
    pub fn public_message(&self) -> &'static str {
        if self.is_malformed_request() {
            MISSING_CREDENTIAL_MESSAGE
        } else {
            UNAUTHORIZED_MESSAGE
        }
    }

    /// Pipeline stage name, for structured logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingCredential => "extract",
            Self::VerificationFailed(_) => "verify",
            Self::WrongTokenType(_) | Self::InsufficientScope(_) => "validate",
        }
    }
}

/// Signature / trust verification failures.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("invalid token header: {0}")]
    Header(#[source] jsonwebtoken::errors::Error),

    #[error("signing algorithm {0:?} is not allowed")]
    AlgorithmNotAllowed(Algorithm),

    #[error(transparent)]
    KeyResolution(#[from] KeyError),

    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("malformed '{0}' claim")]
    MalformedClaim(&'static str),
}

/// Key-resolution failures reported by a `KeyResolver`.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("no key matches kid {0:?}")]
    UnknownKey(Option<String>),

    #[error("token has no kid and the key set holds {0} keys")]
    AmbiguousKey(usize),

    #[error("unusable jwk: {0}")]
    InvalidJwk(#[source] jsonwebtoken::errors::Error),

    #[error("key source request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("key source returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("key source unavailable: last fetch attempt failed within cooldown")]
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("scope claim is missing")]
    Missing,
    #[error("scope claim is not a string")]
    NotAString,
    #[error("required scope '{0}' not granted")]
    NotGranted(&'static str),
}
