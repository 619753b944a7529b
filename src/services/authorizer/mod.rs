pub mod claims;
pub mod credential;
pub mod decision;
pub mod error;
pub mod factory;
pub mod key_source;
pub mod pipeline;
pub mod trust;
pub mod verifier;

pub use claims::{AccessClaims, ClaimSet, REQUIRED_SCOPE, VerifiedClaims};
pub use decision::AuthorizationDecision;
pub use error::{AuthorizationError, KeyError, ScopeError, VerifyError};
pub use factory::build_authorizer;
pub use key_source::{KeyResolver, RemoteJwks, RemoteJwksPolicy, StaticJwks};
pub use pipeline::{AuthorizationRequest, Authorizer};
pub use trust::TrustParameters;
pub use verifier::{JwtVerifier, TokenVerifier};
