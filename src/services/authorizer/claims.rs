/*
 * Responsibility
 * - 署名検証済み payload (loosely-typed map) → VerifiedClaims への型付け
 * - token_use / scope の検証 (Claims Validator)
 *
 * Notes
 * - VerifiedClaims は pipeline が verifier の出力からのみ生成する (pub(super))
 * - aud 等の追加検証はここでは行わない
 */
use serde_json::{Map, Value};

use super::error::{AuthorizationError, ScopeError, VerifyError};

/// Raw claim set returned by a `TokenVerifier` after a successful signature check.
pub type ClaimSet = Map<String, Value>;

/// Scope every caller must hold (Cognito administrative user API).
pub const REQUIRED_SCOPE: &str = "aws.cognito.signin.user.admin";

const ACCESS_TOKEN_USE: &str = "access";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScopeClaim {
    Absent,
    NotAString,
    Text(String),
}

/// Strongly-typed view of a verified payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    token_use: Option<String>,
    sub: Option<String>,
    username: Option<String>,
    scope: ScopeClaim,
}

impl VerifiedClaims {
    /// Only called on the output of a successful signature check.
    ///
    /// `sub` must be a string when present (RFC 7519). Other type mismatches
    /// are kept as "not usable" and judged by the validator / decision builder.
    pub(super) fn from_verified(payload: ClaimSet) -> Result<Self, VerifyError> {
        let sub = match payload.get("sub") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(VerifyError::MalformedClaim("sub")),
        };

        let scope = match payload.get("scope") {
            None | Some(Value::Null) => ScopeClaim::Absent,
            Some(Value::String(s)) => ScopeClaim::Text(s.clone()),
            Some(_) => ScopeClaim::NotAString,
        };

        Ok(Self {
            token_use: string_claim(&payload, "token_use"),
            sub,
            username: string_claim(&payload, "username"),
            scope,
        })
    }
}

fn string_claim(payload: &ClaimSet, name: &str) -> Option<String> {
    payload.get(name).and_then(Value::as_str).map(str::to_owned)
}

/// Claims that passed token classification and scope checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    pub sub: Option<String>,
    pub username: Option<String>,
    // Raw, unmodified scope string.
    pub scope: String,
}

impl AccessClaims {
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split(' ')
    }
}

/// Require an access token carrying `REQUIRED_SCOPE`.
pub fn validate(claims: VerifiedClaims) -> Result<AccessClaims, AuthorizationError> {
    if claims.token_use.as_deref() != Some(ACCESS_TOKEN_USE) {
        return Err(AuthorizationError::WrongTokenType(claims.token_use));
    }

    let scope = match claims.scope {
        ScopeClaim::Text(scope) => scope,
        ScopeClaim::Absent => return Err(ScopeError::Missing.into()),
        ScopeClaim::NotAString => return Err(ScopeError::NotAString.into()),
    };

    if !has_scope(&scope, REQUIRED_SCOPE) {
        return Err(ScopeError::NotGranted(REQUIRED_SCOPE).into());
    }

    Ok(AccessClaims {
        sub: claims.sub,
        username: claims.username,
        scope,
    })
}

fn has_scope(scope: &str, required: &str) -> bool {
    scope.split(' ').any(|s| s == required)
}
